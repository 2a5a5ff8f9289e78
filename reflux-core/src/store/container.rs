//! Store Implementation
//!
//! The store owns the current state, the reducer, and the listener registry.
//! All state changes go through [`Store::dispatch`].
//!
//! # How Dispatch Works
//!
//! 1. The action is validated: it must be a plain record with a defined type.
//!
//! 2. The phase token moves from `Idle` to `Dispatching`. A second dispatch
//!    arriving while the token is held (i.e. from inside the reducer) is
//!    rejected.
//!
//! 3. The reducer computes the next state from the current one. A drop guard
//!    returns the token to `Idle` even if the reducer panics, in which case
//!    the state is left untouched.
//!
//! 4. The new state replaces the old one wholesale.
//!
//! 5. Every listener registered at that point is called, in registration
//!    order, before `dispatch` returns.
//!
//! # Thread Safety
//!
//! The registry lives behind a `parking_lot::ReentrantMutex`. Another thread
//! touching the store waits until the whole dispatch (notification included)
//! has finished. The dispatching thread itself may re-enter, which is how
//! listeners can read state or dispatch again, and how calls made from inside
//! the reducer reach the phase check and get rejected instead of deadlocking.

use std::cell::RefCell;
use std::fmt::Debug;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::ReentrantMutex;
use smallvec::SmallVec;

use super::action::{Action, ActionTypes};
use super::listener::{Listener, ListenerId, ListenerRegistry, Subscription};
use crate::error::{ConfigurationError, ProtocolViolation, Result};

/// Pure transition function. Receives `None` when no state exists yet and
/// must then produce the initial state.
pub type Reducer<S, A> = Arc<dyn Fn(Option<&S>, &A) -> S + Send + Sync>;

/// A dispatch function. Returns the action it was given.
pub type Dispatch<A> = Arc<dyn Fn(A) -> Result<A> + Send + Sync>;

/// A store constructor, as handed to enhancers.
pub type StoreCreator<S, A> = Arc<dyn Fn(StoreConfig<S, A>) -> Result<Store<S, A>> + Send + Sync>;

/// Wraps store construction to add behavior.
pub type Enhancer<S, A> = Arc<dyn Fn(StoreCreator<S, A>) -> StoreCreator<S, A> + Send + Sync>;

/// Whether a reducer call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Dispatching,
}

/// Everything needed to build a store.
pub struct StoreConfig<S, A> {
    /// The transition function. Required.
    pub reducer: Option<Reducer<S, A>>,

    /// State to start from instead of the reducer's own default.
    pub preloaded_state: Option<S>,

    /// Wraps construction, e.g. [`apply_middleware`](super::apply_middleware).
    pub enhancer: Option<Enhancer<S, A>>,
}

impl<S, A> StoreConfig<S, A> {
    /// Config with the given reducer and nothing else.
    pub fn new<F>(reducer: F) -> Self
    where
        F: Fn(Option<&S>, &A) -> S + Send + Sync + 'static,
    {
        Self {
            reducer: Some(Arc::new(reducer)),
            preloaded_state: None,
            enhancer: None,
        }
    }

    /// Start from `state` instead of the reducer's default.
    pub fn with_preloaded_state(mut self, state: S) -> Self {
        self.preloaded_state = Some(state);
        self
    }

    /// Build the store through `enhancer`.
    pub fn with_enhancer(mut self, enhancer: Enhancer<S, A>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }
}

impl<S, A> Default for StoreConfig<S, A> {
    fn default() -> Self {
        Self {
            reducer: None,
            preloaded_state: None,
            enhancer: None,
        }
    }
}

/// Build a store.
///
/// With an enhancer, construction is delegated to
/// `enhancer(create_store)(config)` so the enhancer can build the base store
/// itself and wrap it. Otherwise the store is created and immediately
/// bootstrapped with the reserved [`ActionTypes::init`] action.
pub fn create_store<S, A>(mut config: StoreConfig<S, A>) -> Result<Store<S, A>>
where
    S: Send + Sync + 'static,
    A: Action,
{
    if let Some(enhancer) = config.enhancer.take() {
        let creator: StoreCreator<S, A> = Arc::new(create_store::<S, A>);
        return enhancer(creator)(config);
    }

    let reducer = config.reducer.ok_or(ConfigurationError::MissingReducer)?;
    let inner = Arc::new(StoreInner::new(reducer, config.preloaded_state));

    let raw = Arc::clone(&inner);
    let dispatch: Dispatch<A> = Arc::new(move |action| raw.dispatch(action));

    tracing::debug!(action = ActionTypes::init(), "bootstrapping store");
    inner.dispatch(A::bootstrap(ActionTypes::init()))?;

    Ok(Store { inner, dispatch })
}

/// Mutable store internals. Only touched while the reentrant lock is held.
struct Registry<S, A> {
    reducer: Reducer<S, A>,
    state: Option<Arc<S>>,
    listeners: IndexMap<ListenerId, Listener>,
    phase: DispatchPhase,
}

struct StoreInner<S, A> {
    registry: ReentrantMutex<RefCell<Registry<S, A>>>,
}

/// Returns the phase token to `Idle` when dropped.
struct PhaseGuard<'a, S, A> {
    registry: &'a RefCell<Registry<S, A>>,
}

impl<S, A> Drop for PhaseGuard<'_, S, A> {
    fn drop(&mut self) {
        self.registry.borrow_mut().phase = DispatchPhase::Idle;
    }
}

impl<S, A> StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn new(reducer: Reducer<S, A>, preloaded_state: Option<S>) -> Self {
        Self {
            registry: ReentrantMutex::new(RefCell::new(Registry {
                reducer,
                state: preloaded_state.map(Arc::new),
                listeners: IndexMap::new(),
                phase: DispatchPhase::Idle,
            })),
        }
    }

    fn dispatch(&self, action: A) -> Result<A> {
        if !action.is_plain_record() {
            return Err(ProtocolViolation::NotPlainRecord.into());
        }

        let guard = self.registry.lock();

        let (reducer, current) = {
            let mut registry = guard.borrow_mut();
            let Some(action_type) = action.action_type() else {
                return Err(ProtocolViolation::UndefinedType.into());
            };
            if registry.phase == DispatchPhase::Dispatching {
                return Err(ProtocolViolation::ReducerDispatched.into());
            }

            tracing::debug!(
                action = %action_type,
                listeners = registry.listeners.len(),
                "dispatching action"
            );

            registry.phase = DispatchPhase::Dispatching;
            (Arc::clone(&registry.reducer), registry.state.clone())
        };

        let next = {
            let _phase = PhaseGuard { registry: &*guard };
            reducer(current.as_deref(), &action)
        };

        // Subscribe/unsubscribe were locked out while the reducer ran, so this
        // is the same set that was registered when the dispatch started.
        let listeners: SmallVec<[Listener; 8]> = {
            let mut registry = guard.borrow_mut();
            registry.state = Some(Arc::new(next));
            registry.listeners.values().cloned().collect()
        };

        for listener in &listeners {
            listener();
        }

        Ok(action)
    }

    fn get_state(&self) -> Result<Arc<S>> {
        let guard = self.registry.lock();
        let registry = guard.borrow();

        if registry.phase == DispatchPhase::Dispatching {
            return Err(ProtocolViolation::GetStateWhileDispatching.into());
        }

        // The state is only absent while the bootstrap reducer runs.
        registry
            .state
            .clone()
            .ok_or_else(|| ProtocolViolation::GetStateWhileDispatching.into())
    }

    fn add_listener(&self, listener: Listener) -> Result<ListenerId> {
        let guard = self.registry.lock();
        let mut registry = guard.borrow_mut();

        if registry.phase == DispatchPhase::Dispatching {
            return Err(ProtocolViolation::SubscribeWhileDispatching.into());
        }

        let id = ListenerId::new();
        registry.listeners.insert(id, listener);
        tracing::trace!(listener = id.raw(), total = registry.listeners.len(), "listener subscribed");
        Ok(id)
    }

    fn phase(&self) -> DispatchPhase {
        self.registry.lock().borrow().phase
    }

    fn listener_count(&self) -> usize {
        self.registry.lock().borrow().listeners.len()
    }
}

impl<S, A> ListenerRegistry for StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn remove_listener(&self, id: ListenerId) -> Result<()> {
        let guard = self.registry.lock();
        let mut registry = guard.borrow_mut();

        if registry.phase == DispatchPhase::Dispatching {
            return Err(ProtocolViolation::UnsubscribeWhileDispatching.into());
        }

        registry.listeners.shift_remove(&id);
        tracing::trace!(listener = id.raw(), total = registry.listeners.len(), "listener unsubscribed");
        Ok(())
    }
}

/// A state container.
///
/// # Example
///
/// ```rust
/// use reflux_core::store::{create_store, StoreConfig};
/// use reflux_core::AnyAction;
///
/// let store = create_store(StoreConfig::new(|state: Option<&i64>, action: &AnyAction| {
///     let count = state.copied().unwrap_or(0);
///     match action.action_type.as_str() {
///         "INC" => count + 1,
///         _ => count,
///     }
/// }))
/// .unwrap();
///
/// store.dispatch(AnyAction::new("INC")).unwrap();
/// assert_eq!(*store.get_state().unwrap(), 1);
/// ```
///
/// Cloning a store yields another handle to the same state.
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
    dispatch: Dispatch<A>,
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Get the current state.
    ///
    /// Fails if called from inside the reducer.
    pub fn get_state(&self) -> Result<Arc<S>> {
        self.inner.get_state()
    }

    /// Dispatch an action through this handle's dispatch function (which may
    /// be wrapped by middleware). Returns the action.
    pub fn dispatch(&self, action: A) -> Result<A> {
        (self.dispatch)(action)
    }

    /// The externally visible dispatch function.
    ///
    /// Every call returns the same `Arc`, so it can be compared with
    /// `Arc::ptr_eq` or stored by a component across renders.
    pub fn dispatcher(&self) -> Dispatch<A> {
        Arc::clone(&self.dispatch)
    }

    /// Register a listener to run after every dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Register an already shared listener.
    ///
    /// Registering the same `Arc` twice creates two independent
    /// registrations.
    pub fn subscribe_listener(&self, listener: Listener) -> Result<Subscription> {
        let id = self.inner.add_listener(listener)?;
        let registry: Weak<dyn ListenerRegistry> = Arc::downgrade(&self.inner) as Weak<dyn ListenerRegistry>;
        Ok(Subscription::new(id, registry))
    }

    /// A handle sharing this store's state and listeners but dispatching
    /// through `dispatch`.
    ///
    /// This is what enhancers return after wrapping the base dispatch.
    pub fn with_dispatcher(&self, dispatch: Dispatch<A>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dispatch,
        }
    }

    /// Whether the reducer is currently running.
    ///
    /// Only meaningful on the dispatching thread; other threads wait for the
    /// dispatch to finish and always observe `false`.
    pub fn is_dispatching(&self) -> bool {
        self.inner.phase() == DispatchPhase::Dispatching
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
            dispatch: Arc::downgrade(&self.dispatch),
        }
    }

    /// Whether two handles point at the same underlying store.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<S, A> Debug for Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("phase", &self.inner.phase())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Non-owning store handle, used by listeners that must not keep their own
/// store alive.
pub struct WeakStore<S, A> {
    inner: Weak<StoreInner<S, A>>,
    dispatch: Weak<dyn Fn(A) -> Result<A> + Send + Sync>,
}

impl<S, A> WeakStore<S, A> {
    /// A strong handle, or `None` once the store has been dropped.
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        Some(Store {
            inner: self.inner.upgrade()?,
            dispatch: self.dispatch.upgrade()?,
        })
    }
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
            dispatch: Weak::clone(&self.dispatch),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
