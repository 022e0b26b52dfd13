//! Pointer-event mapping: raw platform pointer events in, normalized mouse
//! events out.

use crate::event::{
    KeyModifiers, MouseEvent, MouseEventPeer, MouseEventSource, MouseEventSpec, Registration,
};
use crate::geometry::Vector;
use futures_util::{Stream, StreamExt};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default double-click window.
pub const DOUBLE_CLICK_INTERVAL_MS: u64 = 300;

/// Pointer mapper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Presses closer together than this count towards a double-click.
    pub double_click_interval_ms: u64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            double_click_interval_ms: DOUBLE_CLICK_INTERVAL_MS,
        }
    }
}

/// Raw pointer event kinds, as produced by platform adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawPointerKind {
    Press,
    Release,
    Move,
    Enter,
    Exit,
    Scroll,
}

/// Platform-neutral pointer event shape.
///
/// `position` is in host pixels; `density` is the host's display scale at the
/// moment the event was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPointerEvent {
    pub kind: RawPointerKind,
    pub position: Point,
    /// Whether a button is held down at the time of the event.
    pub pressed: bool,
    pub scroll_delta: Vec2,
    pub modifiers: KeyModifiers,
    pub density: f64,
    /// Monotonic event time.
    pub timestamp: Duration,
}

impl RawPointerEvent {
    pub fn new(kind: RawPointerKind, position: Point, timestamp: Duration) -> Self {
        Self {
            kind,
            position,
            pressed: matches!(kind, RawPointerKind::Press),
            scroll_delta: Vec2::ZERO,
            modifiers: KeyModifiers::empty(),
            density: 1.0,
            timestamp,
        }
    }

    pub fn press(position: Point, timestamp: Duration) -> Self {
        Self::new(RawPointerKind::Press, position, timestamp)
    }

    pub fn release(position: Point, timestamp: Duration) -> Self {
        Self::new(RawPointerKind::Release, position, timestamp)
    }

    pub fn moved(position: Point, pressed: bool, timestamp: Duration) -> Self {
        Self {
            pressed,
            ..Self::new(RawPointerKind::Move, position, timestamp)
        }
    }

    pub fn scroll(position: Point, delta: Vec2, timestamp: Duration) -> Self {
        Self {
            scroll_delta: delta,
            ..Self::new(RawPointerKind::Scroll, position, timestamp)
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A normalized event as dispatched through the event peer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedEvent {
    pub spec: MouseEventSpec,
    pub event: MouseEvent,
}

/// Gesture state for one interactive surface.
#[derive(Debug, Clone, Default)]
struct GestureState {
    dragging: bool,
    click_count: u32,
    last_press: Option<Duration>,
}

/// Converts a raw pointer stream into the normalized mouse vocabulary:
/// pressed/released/moved/dragged/entered/left/wheel, plus synthesized
/// clicked and double-clicked.
#[derive(Debug)]
pub struct PointerEventMapper {
    peer: MouseEventPeer,
    config: PointerConfig,
    state: GestureState,
    content_offset: Vec2,
    content_scale: Vec2,
}

impl Default for PointerEventMapper {
    fn default() -> Self {
        Self::new(PointerConfig::default())
    }
}

impl PointerEventMapper {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            peer: MouseEventPeer::new(),
            config,
            state: GestureState::default(),
            content_offset: Vec2::ZERO,
            content_scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Set the offset of the rendered plot within its container, in
    /// density-independent pixels.
    pub fn set_content_offset(&mut self, offset: Vec2) {
        self.content_offset = offset;
    }

    pub fn content_offset(&self) -> Vec2 {
        self.content_offset
    }

    /// Set how many density-independent pixels one content unit covers on
    /// each axis. Non-positive factors are treated as 1.
    pub fn set_content_scale(&mut self, scale: Vec2) {
        self.content_scale = Vec2::new(
            if scale.x > 0.0 { scale.x } else { 1.0 },
            if scale.y > 0.0 { scale.y } else { 1.0 },
        );
    }

    pub fn content_scale(&self) -> Vec2 {
        self.content_scale
    }

    pub fn set_config(&mut self, config: PointerConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    /// The peer normalized events are published through.
    pub fn event_peer(&self) -> &MouseEventPeer {
        &self.peer
    }

    /// Current click counter (for diagnostics and tests).
    pub fn click_count(&self) -> u32 {
        self.state.click_count
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Drop any in-progress gesture.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
    }

    /// Convert a host position to content coordinates: divide out the
    /// density, remove the content offset, then divide out the content scale.
    pub fn to_content(&self, position: Point, density: f64) -> Vector {
        let density = if density > 0.0 { density } else { 1.0 };
        Vector::new(
            ((position.x / density - self.content_offset.x) / self.content_scale.x).round() as i32,
            ((position.y / density - self.content_offset.y) / self.content_scale.y).round() as i32,
        )
    }

    /// Process one raw event, dispatching and returning the normalized events
    /// it produced, in dispatch order.
    pub fn handle(&mut self, raw: RawPointerEvent) -> Vec<NormalizedEvent> {
        let location = self.to_content(raw.position, raw.density);
        let modifiers = raw.modifiers;
        let current = if raw.pressed {
            MouseEvent::left_button(location, modifiers)
        } else {
            MouseEvent::no_button(location, modifiers)
        };

        let mut out = Vec::with_capacity(3);
        match raw.kind {
            RawPointerKind::Press => {
                let window = Duration::from_millis(self.config.double_click_interval_ms);
                self.state.click_count = match self.state.last_press {
                    Some(last) if raw.timestamp.saturating_sub(last) < window => {
                        self.state.click_count + 1
                    }
                    _ => 1,
                };
                self.state.last_press = Some(raw.timestamp);
                self.state.dragging = false;
                out.push(NormalizedEvent {
                    spec: MouseEventSpec::Pressed,
                    event: MouseEvent::left_button(location, modifiers),
                });
            }
            RawPointerKind::Release => {
                if self.state.dragging {
                    // A drag never turns into a click, and does not seed a
                    // double-click for the next press.
                    self.state.click_count = 0;
                } else if self.state.click_count > 0 {
                    // Refresh hover state before the click lands.
                    out.push(NormalizedEvent {
                        spec: MouseEventSpec::Moved,
                        event: MouseEvent::no_button(location, modifiers),
                    });
                    let click = MouseEvent::left_button(location, modifiers);
                    match self.state.click_count {
                        1 => out.push(NormalizedEvent {
                            spec: MouseEventSpec::Clicked,
                            event: click,
                        }),
                        2 => out.push(NormalizedEvent {
                            spec: MouseEventSpec::DoubleClicked,
                            event: click,
                        }),
                        _ => {}
                    }
                    if self.state.click_count > 1 {
                        self.state.click_count = 0;
                    }
                }
                self.state.dragging = false;
                out.push(NormalizedEvent {
                    spec: MouseEventSpec::Released,
                    event: MouseEvent::no_button(location, modifiers),
                });
            }
            RawPointerKind::Move => {
                if raw.pressed {
                    self.state.dragging = true;
                    out.push(NormalizedEvent {
                        spec: MouseEventSpec::Dragged,
                        event: current,
                    });
                } else {
                    out.push(NormalizedEvent {
                        spec: MouseEventSpec::Moved,
                        event: current,
                    });
                }
            }
            RawPointerKind::Enter => out.push(NormalizedEvent {
                spec: MouseEventSpec::Entered,
                event: current,
            }),
            RawPointerKind::Exit => out.push(NormalizedEvent {
                spec: MouseEventSpec::Left,
                event: current,
            }),
            RawPointerKind::Scroll => {
                let delta = raw.scroll_delta;
                let amount = if delta.x.abs() > delta.y.abs() {
                    delta.x
                } else {
                    delta.y
                };
                out.push(NormalizedEvent {
                    spec: MouseEventSpec::WheelRotated,
                    event: MouseEvent::wheel(location, modifiers, amount),
                });
            }
        }

        for normalized in &out {
            self.peer.dispatch(normalized.spec, &normalized.event);
        }
        out
    }

    /// Await raw events until the stream ends. Gesture state is reset when
    /// the loop finishes or when the returned future is dropped.
    pub async fn run<S>(&mut self, events: S)
    where
        S: Stream<Item = RawPointerEvent>,
    {
        let mut session = GestureSession { mapper: self };
        let mut events = std::pin::pin!(events);
        while let Some(raw) = events.next().await {
            session.mapper.handle(raw);
        }
        log::debug!("Pointer event stream ended");
    }
}

impl MouseEventSource for PointerEventMapper {
    fn add_event_handler(
        &self,
        spec: MouseEventSpec,
        handler: Box<dyn Fn(&MouseEvent)>,
    ) -> Registration {
        self.peer.add_event_handler(spec, handler)
    }
}

/// Resets gesture state on every exit path of [`PointerEventMapper::run`].
struct GestureSession<'a> {
    mapper: &'a mut PointerEventMapper,
}

impl Drop for GestureSession<'_> {
    fn drop(&mut self) {
        self.mapper.reset();
    }
}
