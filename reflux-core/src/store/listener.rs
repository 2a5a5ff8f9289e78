//! Listeners and subscriptions.
//!
//! A listener is a zero-argument callback the store invokes after every
//! successful dispatch. Subscribing returns a [`Subscription`], the disposer
//! for exactly that one registration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::error::Result;

/// A callback invoked after each dispatch.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Unique identifier for one listener registration.
///
/// Registering the same callback twice yields two ids, so each
/// [`Subscription`] removes only its own entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Something listeners can be removed from.
pub(crate) trait ListenerRegistry: Send + Sync {
    fn remove_listener(&self, id: ListenerId) -> Result<()>;
}

/// Handle to a registered listener.
///
/// Dropping an active subscription unsubscribes it.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<dyn ListenerRegistry>,
    active: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: Weak<dyn ListenerRegistry>) -> Self {
        Self {
            id,
            registry,
            active: AtomicBool::new(true),
        }
    }

    /// The id of the registration this handle controls.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered through this handle.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Remove the listener from the store.
    ///
    /// Fails while the reducer is executing. Once it has succeeded, further
    /// calls are no-ops.
    pub fn unsubscribe(&self) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.remove_listener(self.id)?;
        }

        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Err(err) = self.unsubscribe() {
            tracing::warn!(
                listener = self.id.raw(),
                error = %err,
                "dropped subscription could not unsubscribe; listener stays registered"
            );
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    use crate::error::ProtocolViolation;

    struct MockRegistry {
        removed: AtomicI32,
        locked: AtomicBool,
    }

    impl MockRegistry {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                removed: AtomicI32::new(0),
                locked: AtomicBool::new(false),
            })
        }
    }

    impl ListenerRegistry for MockRegistry {
        fn remove_listener(&self, _id: ListenerId) -> Result<()> {
            if self.locked.load(Ordering::SeqCst) {
                return Err(ProtocolViolation::UnsubscribeWhileDispatching.into());
            }
            self.removed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn subscription_for(registry: &Arc<MockRegistry>) -> Subscription {
        let registry: Arc<dyn ListenerRegistry> = registry.clone();
        Subscription::new(ListenerId::new(), Arc::downgrade(&registry))
    }

    #[test]
    fn listener_ids_are_unique() {
        let id1 = ListenerId::new();
        let id2 = ListenerId::new();
        let id3 = ListenerId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn unsubscribe_twice_removes_once() {
        let registry = MockRegistry::new();
        let subscription = subscription_for(&registry);

        subscription.unsubscribe().unwrap();
        subscription.unsubscribe().unwrap();
        drop(subscription);

        assert_eq!(registry.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_unsubscribe_stays_active() {
        let registry = MockRegistry::new();
        let subscription = subscription_for(&registry);

        registry.locked.store(true, Ordering::SeqCst);
        assert!(subscription.unsubscribe().is_err());
        assert!(subscription.is_active());

        registry.locked.store(false, Ordering::SeqCst);
        subscription.unsubscribe().unwrap();
        assert!(!subscription.is_active());
    }

    #[test]
    fn drop_unsubscribes() {
        let registry = MockRegistry::new();
        drop(subscription_for(&registry));
        assert_eq!(registry.removed.load(Ordering::SeqCst), 1);
    }
}
