//! Normalized mouse and keyboard event records.

use crate::geometry::Vector;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.meta)
    }
}

/// Event kinds the interaction layer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseEventSpec {
    Pressed,
    Released,
    Moved,
    Dragged,
    Entered,
    Left,
    Clicked,
    DoubleClicked,
    WheelRotated,
}

impl MouseEventSpec {
    /// All event kinds, in declaration order.
    pub fn all() -> &'static [MouseEventSpec] {
        &[
            MouseEventSpec::Pressed,
            MouseEventSpec::Released,
            MouseEventSpec::Moved,
            MouseEventSpec::Dragged,
            MouseEventSpec::Entered,
            MouseEventSpec::Left,
            MouseEventSpec::Clicked,
            MouseEventSpec::DoubleClicked,
            MouseEventSpec::WheelRotated,
        ]
    }
}

/// An immutable mouse event in content-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub location: Vector,
    pub button: Button,
    pub modifiers: KeyModifiers,
    /// Wheel rotation amount; only set for [`MouseEventSpec::WheelRotated`].
    pub scroll_amount: Option<f64>,
}

impl MouseEvent {
    pub fn new(location: Vector, button: Button, modifiers: KeyModifiers) -> Self {
        Self {
            location,
            button,
            modifiers,
            scroll_amount: None,
        }
    }

    pub fn left_button(location: Vector, modifiers: KeyModifiers) -> Self {
        Self::new(location, Button::Left, modifiers)
    }

    pub fn no_button(location: Vector, modifiers: KeyModifiers) -> Self {
        Self::new(location, Button::None, modifiers)
    }

    pub fn wheel(location: Vector, modifiers: KeyModifiers, scroll_amount: f64) -> Self {
        Self {
            location,
            button: Button::None,
            modifiers,
            scroll_amount: Some(scroll_amount),
        }
    }

    pub fn x(&self) -> i32 {
        self.location.x
    }

    pub fn y(&self) -> i32 {
        self.location.y
    }
}

/// Keyboard event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Logical key name (e.g. `"a"`, `"Escape"`).
    pub key: String,
    pub modifiers: KeyModifiers,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn pressed(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            pressed: true,
        }
    }

    pub fn released(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            pressed: false,
        }
    }
}
