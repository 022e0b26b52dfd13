//! Event records and the event peer they are published through.

mod mouse;
mod peer;

pub use mouse::{Button, KeyEvent, KeyModifiers, MouseEvent, MouseEventSpec};
pub use peer::{CompositeRegistration, EventPeer, Registration};

/// Event peer for normalized mouse events.
pub type MouseEventPeer = EventPeer<MouseEventSpec, MouseEvent>;

/// Anything that publishes normalized mouse events.
pub trait MouseEventSource {
    fn add_event_handler(
        &self,
        spec: MouseEventSpec,
        handler: Box<dyn Fn(&MouseEvent)>,
    ) -> Registration;
}

impl MouseEventSource for MouseEventPeer {
    fn add_event_handler(
        &self,
        spec: MouseEventSpec,
        handler: Box<dyn Fn(&MouseEvent)>,
    ) -> Registration {
        EventPeer::add_event_handler(self, spec, handler)
    }
}
