//! Dispatch access for components.

use super::context::{use_store, Context};
use crate::error::Result;
use crate::store::{Action, Dispatch};

/// The dispatch function of the store provided to `ctx`.
///
/// The same `Arc` is returned on every call for a given store, so components
/// can keep it across renders or compare it with `Arc::ptr_eq`.
pub fn use_dispatch<S, A>(ctx: &Context) -> Result<Dispatch<A>>
where
    S: Send + Sync + 'static,
    A: Action,
{
    Ok(use_store::<S, A>(ctx)?.dispatcher())
}
