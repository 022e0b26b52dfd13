//! Plotview Core Library
//!
//! Platform-agnostic scene graph, event records and pointer-event mapping
//! shared by the renderer and the host application.

pub mod event;
pub mod geometry;
pub mod input;
pub mod svg;

pub use event::{
    Button, CompositeRegistration, EventPeer, KeyEvent, KeyModifiers, MouseEvent, MouseEventPeer,
    MouseEventSource, MouseEventSpec, Registration,
};
pub use geometry::Vector;
pub use input::{NormalizedEvent, PointerConfig, PointerEventMapper, RawPointerEvent, RawPointerKind};
pub use svg::{
    AttributeValue, ChangeFeed, ElementId, ElementKind, SceneError, SceneResult, StyleSheet,
    SvgChange, SvgDocument, TextStyle, Visibility,
};
