//! Selector Subscriptions
//!
//! A selector subscription lets a component depend on a slice of the store's
//! state instead of the whole thing. The component re-renders only when the
//! slice changes.
//!
//! # How It Works
//!
//! 1. On mount, the subscription resolves the store from the context,
//!    projects the current state, and keeps the result as the last value it
//!    has signalled for.
//!
//! 2. Every render calls [`SelectorSubscription::select`], which projects the
//!    current state again so the render never sees a stale slice.
//!
//! 3. After each dispatch, the store calls the subscription's listener. It
//!    projects the new state and compares it with the last signalled value.
//!    If they differ, the new value is stored and the host is asked to
//!    re-render. If they are equal, nothing happens.
//!
//! 4. On unmount (or drop) the listener is removed, exactly once.
//!
//! # Host Contract
//!
//! The host rendering system implements [`RenderSignal`]. A render request
//! made from inside a listener must eventually lead to the component calling
//! `select` again before it reacts to later dispatches.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use super::context::{use_store, Context};
use crate::error::Result;
use crate::store::{Action, Store, Subscription};

/// Projects the store's state onto the slice a component needs.
pub type Projection<S, T> = Arc<dyn Fn(&S) -> T + Send + Sync>;

/// Decides whether two projected slices are the same.
pub type Equality<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Asks the host rendering system to re-render a component.
pub trait RenderSignal: Send + Sync {
    fn request_render(&self);
}

impl<F> RenderSignal for F
where
    F: Fn() + Send + Sync,
{
    fn request_render(&self) {
        self()
    }
}

/// A component's subscription to a slice of the store's state.
pub struct SelectorSubscription<S, A, T> {
    store: Store<S, A>,
    projection: Projection<S, T>,
    last: Arc<Mutex<T>>,
    subscription: Subscription,
}

impl<S, A, T> SelectorSubscription<S, A, T>
where
    S: Send + Sync + 'static,
    A: Action,
    T: Clone + Send + 'static,
{
    /// Subscribe to `projection` of the store provided to `ctx`.
    ///
    /// `equality` decides whether a new slice warrants a render; `signal` is
    /// called when it does.
    pub fn mount<P, E, R>(ctx: &Context, projection: P, equality: E, signal: R) -> Result<Self>
    where
        P: Fn(&S) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        R: RenderSignal + 'static,
    {
        let store = use_store::<S, A>(ctx)?;
        let projection: Projection<S, T> = Arc::new(projection);
        let equality: Equality<T> = Arc::new(equality);

        let last = Arc::new(Mutex::new(projection(&*store.get_state()?)));

        let listener = {
            let store = store.downgrade();
            let projection = Arc::clone(&projection);
            let last = Arc::clone(&last);

            move || {
                let Some(store) = store.upgrade() else {
                    return;
                };
                let state = match store.get_state() {
                    Ok(state) => state,
                    Err(err) => {
                        tracing::warn!(error = %err, "selector could not read state after dispatch");
                        return;
                    }
                };

                let next = projection(&*state);
                {
                    let mut last = last.lock();
                    if equality(&next, &*last) {
                        return;
                    }
                    *last = next;
                }

                tracing::trace!("selected state changed; requesting render");
                signal.request_render();
            }
        };

        let subscription = store.subscribe(listener)?;

        Ok(Self {
            store,
            projection,
            last,
            subscription,
        })
    }

    /// Project the current state for the render in progress.
    ///
    /// Reads through [`Store::get_state`], so it fails the same way when
    /// called from inside the reducer.
    pub fn select(&self) -> Result<T> {
        let state = self.store.get_state()?;
        Ok((self.projection)(&*state))
    }

    /// The slice that triggered the most recent render request, or the
    /// value seen at mount if none has.
    pub fn last_signalled(&self) -> T {
        self.last.lock().clone()
    }

    /// Whether the listener is still registered.
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Remove the listener. Later calls, and the eventual drop, do nothing.
    pub fn unmount(&self) -> Result<()> {
        self.subscription.unsubscribe()
    }
}

impl<S, A, T> Debug for SelectorSubscription<S, A, T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorSubscription")
            .field("last", &*self.last.lock())
            .field("subscription", &self.subscription)
            .finish()
    }
}

/// Subscribe to `projection` with `==` as the equality check.
pub fn use_selector<S, A, T, P, R>(
    ctx: &Context,
    projection: P,
    signal: R,
) -> Result<SelectorSubscription<S, A, T>>
where
    S: Send + Sync + 'static,
    A: Action,
    T: Clone + PartialEq + Send + 'static,
    P: Fn(&S) -> T + Send + Sync + 'static,
    R: RenderSignal + 'static,
{
    SelectorSubscription::mount(ctx, projection, |a: &T, b: &T| a == b, signal)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
