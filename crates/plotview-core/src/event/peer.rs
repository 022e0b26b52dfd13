//! Publish/subscribe dispatch keyed by event kind.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct PeerInner<K, E> {
    next_id: u64,
    handlers: Vec<(u64, K, Handler<E>)>,
}

/// Single publish point for events of type `E`, keyed by kind `K`.
///
/// Handlers for one kind run in registration order. A handler may register or
/// remove handlers (including itself) while a dispatch is in progress; a
/// handler removed mid-dispatch is not invoked afterwards.
pub struct EventPeer<K, E> {
    inner: Rc<RefCell<PeerInner<K, E>>>,
}

impl<K, E> Default for EventPeer<K, E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PeerInner {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }
}

impl<K, E> Clone for EventPeer<K, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, E> fmt::Debug for EventPeer<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPeer")
            .field("handlers", &self.inner.borrow().handlers.len())
            .finish()
    }
}

impl<K, E> EventPeer<K, E>
where
    K: Copy + Eq + Hash + 'static,
    E: 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`. The handler stays registered until the
    /// returned [`Registration`] is disposed or dropped.
    pub fn add_event_handler(&self, kind: K, handler: impl Fn(&E) + 'static) -> Registration {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.handlers.push((id, kind, Rc::new(handler)));
            id
        };

        let weak: Weak<RefCell<PeerInner<K, E>>> = Rc::downgrade(&self.inner);
        Registration::on_remove(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().handlers.retain(|(hid, _, _)| *hid != id);
            }
        })
    }

    /// Invoke every handler registered for `kind`.
    pub fn dispatch(&self, kind: K, event: &E) {
        let snapshot: Vec<(u64, Handler<E>)> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(id, _, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            let still_registered = self
                .inner
                .borrow()
                .handlers
                .iter()
                .any(|(hid, _, _)| *hid == id);
            if still_registered {
                handler(event);
            }
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: K) -> usize {
        self.inner
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

/// Handle to a registration. Disposing it (explicitly or on drop) runs the
/// removal exactly once.
#[must_use = "dropping a Registration removes it immediately"]
pub struct Registration {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    pub fn on_remove(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    /// A registration with nothing to remove.
    pub fn empty() -> Self {
        Self { remove: None }
    }

    /// Remove the registration. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.remove.is_none()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A group of registrations disposed together.
#[derive(Debug, Default)]
pub struct CompositeRegistration {
    registrations: Vec<Registration>,
}

impl CompositeRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, registration: Registration) -> &mut Self {
        self.registrations.push(registration);
        self
    }

    pub fn dispose(&mut self) {
        for mut registration in self.registrations.drain(..) {
            registration.dispose();
        }
    }
}
