//! Reflux Core
//!
//! This crate provides the core of the Reflux state library.
//! It implements:
//!
//! - A synchronous state container (store, reducer, listeners)
//! - Middleware chains and store enhancers
//! - Context scopes for handing a store down a component tree
//! - Selector subscriptions that re-render a component only when its slice
//!   of state changes
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `store`: The state container, actions, composition and middleware
//! - `binding`: Context propagation, dispatch access and selectors
//! - `error`: The error taxonomy shared by both
//!
//! # Example
//!
//! ```rust
//! use reflux_core::binding::{use_dispatch, use_selector, Context, SelectorSubscription};
//! use reflux_core::store::{apply_middleware, create_store, logger, StoreConfig};
//! use reflux_core::AnyAction;
//!
//! #[derive(Clone, PartialEq)]
//! struct CountState {
//!     count: i64,
//! }
//!
//! fn reducer(state: Option<&CountState>, action: &AnyAction) -> CountState {
//!     let state = state.cloned().unwrap_or(CountState { count: 3 });
//!     match action.action_type.as_str() {
//!         "INCREASE" => CountState { count: state.count + 1 },
//!         _ => state,
//!     }
//! }
//!
//! let store = create_store(
//!     StoreConfig::new(reducer).with_enhancer(apply_middleware(vec![logger()])),
//! )
//! .unwrap();
//!
//! // The provider.
//! let ctx = Context::root().provide_store(store);
//!
//! // A component.
//! let dispatch = use_dispatch::<CountState, AnyAction>(&ctx).unwrap();
//! let count: SelectorSubscription<CountState, AnyAction, i64> =
//!     use_selector(&ctx, |s: &CountState| s.count, || println!("re-render")).unwrap();
//!
//! assert_eq!(count.select().unwrap(), 3);
//! dispatch(AnyAction::new("INCREASE")).unwrap(); // prints "re-render"
//! assert_eq!(count.select().unwrap(), 4);
//! ```

pub mod binding;
pub mod error;
pub mod store;

pub use error::{ConfigurationError, ProtocolViolation, Result, StoreError};
pub use store::{Action, ActionTypes, AnyAction};
