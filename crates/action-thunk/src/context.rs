// context.rs — Per-invocation capabilities handed to wrapped work.
//
// The external dispatch mechanism builds one ThunkContext per invocation:
// a dispatch capability, a state accessor, and an extra-data slot. Nothing
// here is global; the thunk only sees what it is given for this call.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::notification::Notification;

/// Anything that accepts dispatched notifications.
///
/// Implemented for plain closures, so `|n: Notification| store.reduce(n)`
/// is a valid dispatcher.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

impl<F> Dispatch for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn dispatch(&self, notification: Notification) {
        self(notification)
    }
}

/// Capabilities available to work during one invocation.
///
/// `S` is the state snapshot type returned by the state accessor. Cloning a
/// context is cheap (two `Arc`s and the extra value), which lets deferred
/// work move a copy into its future.
pub struct ThunkContext<S> {
    dispatcher: Arc<dyn Dispatch>,
    get_state: Arc<dyn Fn() -> S + Send + Sync>,
    extra: Value,
}

impl<S> ThunkContext<S> {
    pub fn new<G>(dispatcher: Arc<dyn Dispatch>, get_state: G) -> Self
    where
        G: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            dispatcher,
            get_state: Arc::new(get_state),
            extra: Value::Null,
        }
    }

    /// Set the extra-data slot and return self.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    /// Dispatch a notification through the external mechanism.
    pub fn dispatch(&self, notification: Notification) {
        self.dispatcher.dispatch(notification);
    }

    /// Current state snapshot.
    pub fn get_state(&self) -> S {
        (self.get_state)()
    }

    pub fn extra(&self) -> &Value {
        &self.extra
    }

    pub(crate) fn dispatcher(&self) -> Arc<dyn Dispatch> {
        Arc::clone(&self.dispatcher)
    }
}

impl ThunkContext<()> {
    /// A context for callers with no state container.
    pub fn stateless(dispatcher: Arc<dyn Dispatch>) -> Self {
        ThunkContext::new(dispatcher, || ())
    }
}

// Manual impl: deriving would require `S: Clone`, which the Arcs don't need.
impl<S> Clone for ThunkContext<S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            get_state: Arc::clone(&self.get_state),
            extra: self.extra.clone(),
        }
    }
}

impl<S> fmt::Debug for ThunkContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThunkContext")
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}
