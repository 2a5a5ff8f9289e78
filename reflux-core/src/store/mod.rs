//! State Container
//!
//! This module implements the store: a synchronous container holding one
//! state value, the reducer that computes the next state, and the listeners
//! that are told about every change.
//!
//! # Concepts
//!
//! ## Store
//!
//! A Store is created once per application root. On construction it runs a
//! reserved init action through the reducer so the reducer can establish its
//! initial state. After that, state only changes through `dispatch`.
//!
//! ## Actions and Reducers
//!
//! An Action is a plain record with a discriminant `type`. A Reducer is a pure
//! function from the current state and an action to the next state. The
//! store never mutates state in place; each dispatch swaps in a fresh value.
//!
//! ## Listeners
//!
//! Listeners run synchronously after every dispatch, in registration order.
//! They are registered with `subscribe` and removed through the returned
//! [`Subscription`].
//!
//! ## Middleware and Enhancers
//!
//! An Enhancer wraps store construction. [`apply_middleware`] is an enhancer
//! that threads dispatch through a chain of middleware layers, composed with
//! [`compose`].
//!
//! # Dispatch Protocol
//!
//! While the reducer runs the store is locked: dispatching again, reading the
//! state, subscribing and unsubscribing all fail with a
//! [`ProtocolViolation`](crate::ProtocolViolation). Listeners run after the
//! lock is released and may do all of these.

mod action;
mod compose;
mod container;
mod listener;
mod middleware;

pub use action::{Action, ActionTypes, AnyAction};
pub use compose::{compose, Transform};
pub use container::{
    create_store, Dispatch, DispatchPhase, Enhancer, Reducer, Store, StoreConfig, StoreCreator,
    WeakStore,
};
pub use listener::{Listener, ListenerId, Subscription};
pub use middleware::{apply_middleware, compose_enhancers, logger, middleware, Logger, Middleware};
