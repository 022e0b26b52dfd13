//! Translation of winit window events into raw pointer events.

use kurbo::{Point, Vec2};
use plotview_core::{KeyModifiers, RawPointerEvent, RawPointerKind};
use std::time::Duration;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Pixels scrolled per wheel line.
const LINE_SCROLL_PIXELS: f64 = 20.0;

/// Tracks cursor position, held buttons, modifiers and display scale across
/// window events.
#[derive(Debug)]
pub struct WinitPointerAdapter {
    position: Point,
    buttons_down: u32,
    modifiers: KeyModifiers,
    scale_factor: f64,
    epoch: Instant,
}

impl WinitPointerAdapter {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            position: Point::ORIGIN,
            buttons_down: 0,
            modifiers: KeyModifiers::empty(),
            scale_factor,
            epoch: Instant::now(),
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn is_pressed(&self) -> bool {
        self.buttons_down > 0
    }

    /// Update state from `event` and return the raw pointer event it
    /// carries, if any.
    pub fn handle(&mut self, event: &WindowEvent) -> Option<RawPointerEvent> {
        let kind = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.position = Point::new(position.x, position.y);
                RawPointerKind::Move
            }
            WindowEvent::CursorEntered { .. } => RawPointerKind::Enter,
            WindowEvent::CursorLeft { .. } => {
                self.buttons_down = 0;
                RawPointerKind::Exit
            }
            WindowEvent::MouseInput { state, .. } => match state {
                ElementState::Pressed => {
                    self.buttons_down += 1;
                    RawPointerKind::Press
                }
                ElementState::Released => {
                    self.buttons_down = self.buttons_down.saturating_sub(1);
                    RawPointerKind::Release
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => {
                        Vec2::new(*x as f64 * LINE_SCROLL_PIXELS, *y as f64 * LINE_SCROLL_PIXELS)
                    }
                    MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x, pos.y),
                };
                return Some(RawPointerEvent {
                    scroll_delta: delta,
                    ..self.raw(RawPointerKind::Scroll)
                });
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = key_modifiers(modifiers.state());
                return None;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                return None;
            }
            _ => return None,
        };
        Some(self.raw(kind))
    }

    fn raw(&self, kind: RawPointerKind) -> RawPointerEvent {
        RawPointerEvent {
            kind,
            position: self.position,
            pressed: self.is_pressed(),
            scroll_delta: Vec2::ZERO,
            modifiers: self.modifiers,
            density: self.scale_factor,
            timestamp: self.timestamp(),
        }
    }

    fn timestamp(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Map winit's modifier state to ours. The super/command key is `meta`.
pub fn key_modifiers(state: ModifiersState) -> KeyModifiers {
    KeyModifiers {
        ctrl: state.control_key(),
        alt: state.alt_key(),
        shift: state.shift_key(),
        meta: state.super_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, MouseButton, TouchPhase};

    fn device() -> DeviceId {
        // SAFETY: the dummy id is only compared, never passed to the platform.
        unsafe { DeviceId::dummy() }
    }

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_press_move_release() {
        let mut adapter = WinitPointerAdapter::new(2.0);
        let raw = adapter.handle(&moved(10.0, 20.0)).unwrap();
        assert_eq!(raw.kind, RawPointerKind::Move);
        assert!(!raw.pressed);
        assert!((raw.density - 2.0).abs() < f64::EPSILON);

        let raw = adapter.handle(&button(ElementState::Pressed)).unwrap();
        assert_eq!(raw.kind, RawPointerKind::Press);
        assert_eq!(raw.position, Point::new(10.0, 20.0));
        assert!(raw.pressed);

        let raw = adapter.handle(&moved(15.0, 20.0)).unwrap();
        assert!(raw.pressed);

        let raw = adapter.handle(&button(ElementState::Released)).unwrap();
        assert_eq!(raw.kind, RawPointerKind::Release);
        assert!(!raw.pressed);
        assert!(!adapter.is_pressed());
    }

    #[test]
    fn test_wheel_deltas() {
        let mut adapter = WinitPointerAdapter::new(1.0);
        let raw = adapter
            .handle(&WindowEvent::MouseWheel {
                device_id: device(),
                delta: MouseScrollDelta::LineDelta(0.0, -1.0),
                phase: TouchPhase::Moved,
            })
            .unwrap();
        assert_eq!(raw.kind, RawPointerKind::Scroll);
        assert_eq!(raw.scroll_delta, Vec2::new(0.0, -20.0));

        let raw = adapter
            .handle(&WindowEvent::MouseWheel {
                device_id: device(),
                delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(3.0, 1.0)),
                phase: TouchPhase::Moved,
            })
            .unwrap();
        assert_eq!(raw.scroll_delta, Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_leave_releases_buttons() {
        let mut adapter = WinitPointerAdapter::new(1.0);
        adapter.handle(&button(ElementState::Pressed));
        let raw = adapter
            .handle(&WindowEvent::CursorLeft { device_id: device() })
            .unwrap();
        assert_eq!(raw.kind, RawPointerKind::Exit);
        assert!(!adapter.is_pressed());
        assert!(adapter.handle(&WindowEvent::Focused(true)).is_none());
    }

    #[test]
    fn test_key_modifiers() {
        let mods = key_modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert!(mods.ctrl && mods.shift);
        assert!(!mods.alt && !mods.meta);
        assert!(key_modifiers(ModifiersState::empty()).is_empty());
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut adapter = WinitPointerAdapter::new(1.0);
        let first = adapter.handle(&moved(0.0, 0.0)).unwrap().timestamp;
        let second = adapter.handle(&moved(1.0, 0.0)).unwrap().timestamp;
        assert!(second >= first);
    }
}
