use std::{
    any::Any,
    fmt,
    sync::{Arc, Weak},
};

/// Implemented by anything that hands out [`Subscription`]s.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

/// Handle to a registered observer.
///
/// The subscription owns the observer; the view only holds it weakly.
/// Dropping the handle (or calling [`unsubscribe`](Subscription::unsubscribe))
/// removes the registration. Releasing twice is a no-op.
pub struct Subscription {
    id: u64,
    cast: Option<Weak<dyn Detach>>,
    keepalive: Option<Arc<dyn Any + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        cast: Weak<dyn Detach>,
        keepalive: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Subscription {
            id,
            cast: Some(cast),
            keepalive: Some(keepalive),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// `true` while the observed view is alive and the handle was not released.
    pub fn is_active(&self) -> bool {
        self.cast
            .as_ref()
            .map_or(false, |cast| cast.strong_count() > 0)
    }

    fn release(&mut self) {
        if let Some(cast) = self.cast.take().and_then(|cast| cast.upgrade()) {
            cast.detach(self.id);
        }
        self.keepalive = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
