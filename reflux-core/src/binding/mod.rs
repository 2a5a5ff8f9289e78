//! View Bindings
//!
//! This module connects a component tree to a store. Components read the
//! store from a [`Context`] instead of receiving it through every
//! constructor, dispatch actions through [`use_dispatch`], and subscribe to
//! slices of state with [`use_selector`].
//!
//! # Concepts
//!
//! ## Context
//!
//! A Context is an explicit scope object passed from parent to child. A
//! provider creates a child scope holding the store; every descendant can
//! resolve it. Resolving outside any provider is an error rather than an
//! empty default, so wiring mistakes surface immediately.
//!
//! ## Selector Subscriptions
//!
//! A [`SelectorSubscription`] is created once per mounted component. It
//! projects the state on every render and asks the host to re-render only
//! when the projected slice changes under its equality check.
//!
//! # Host Integration
//!
//! The crate does not render anything. The host implements [`RenderSignal`]
//! (any `Fn()` closure works) and re-runs the component when asked.

mod context;
mod dispatch;
mod selector;

pub use context::{use_store, Context};
pub use dispatch::use_dispatch;
pub use selector::{use_selector, Equality, Projection, RenderSignal, SelectorSubscription};
