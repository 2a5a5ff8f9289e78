//! Middleware and Enhancers
//!
//! An enhancer wraps store construction. [`apply_middleware`] is the enhancer
//! that ships with the crate: it builds the base store, then replaces the
//! visible dispatch with a chain of middleware layers.
//!
//! # Chain Order
//!
//! For `apply_middleware(vec![m1, m2])`, dispatching runs `m1`'s layer first.
//! Its `next` is `m2`'s layer, whose `next` is the store's raw dispatch:
//!
//! ```text
//! dispatch(action) -> m1 -> m2 -> raw dispatch -> reducer -> listeners
//! ```
//!
//! Each layer may act before and after forwarding, or not forward at all.
//!
//! The base store bootstraps with its raw dispatch, so middleware never sees
//! the init action, and nothing is dispatched while the chain is being wired.

use std::borrow::Cow;
use std::sync::Arc;

use super::action::Action;
use super::compose::{compose, Transform};
use super::container::{Dispatch, Enhancer, StoreConfig, StoreCreator};

/// A layer around dispatch.
///
/// `wrap` receives the next dispatch in the chain and returns the dispatch
/// this layer exposes. It gets no store-specific argument.
pub trait Middleware<A>: Send + Sync {
    fn wrap(&self, next: Dispatch<A>) -> Dispatch<A>;
}

impl<A, F> Middleware<A> for F
where
    F: Fn(Dispatch<A>) -> Dispatch<A> + Send + Sync,
{
    fn wrap(&self, next: Dispatch<A>) -> Dispatch<A> {
        self(next)
    }
}

/// Box a closure as a shareable middleware.
pub fn middleware<A, F>(wrap: F) -> Arc<dyn Middleware<A>>
where
    A: 'static,
    F: Fn(Dispatch<A>) -> Dispatch<A> + Send + Sync + 'static,
{
    Arc::new(wrap)
}

/// Enhancer that routes dispatch through `middlewares`, first to last.
pub fn apply_middleware<S, A>(middlewares: Vec<Arc<dyn Middleware<A>>>) -> Enhancer<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    let middlewares: Arc<[Arc<dyn Middleware<A>>]> = middlewares.into();

    Arc::new(move |create: StoreCreator<S, A>| {
        let middlewares = Arc::clone(&middlewares);
        let creator: StoreCreator<S, A> = Arc::new(move |config: StoreConfig<S, A>| {
            let store = create(config)?;

            let layers: Vec<Transform<Dispatch<A>>> = middlewares
                .iter()
                .map(|layer| {
                    let layer = Arc::clone(layer);
                    Box::new(move |next: Dispatch<A>| layer.wrap(next)) as Transform<Dispatch<A>>
                })
                .collect();

            tracing::debug!(layers = layers.len(), "applying middleware");
            let dispatch = compose(layers)(store.dispatcher());
            Ok(store.with_dispatcher(dispatch))
        });
        creator
    })
}

/// Stack enhancers right-to-left, like [`compose`]: the first enhancer
/// wraps all the others.
pub fn compose_enhancers<S, A>(enhancers: Vec<Enhancer<S, A>>) -> Enhancer<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    let chain: Arc<Transform<StoreCreator<S, A>>> = Arc::new(compose(
        enhancers
            .into_iter()
            .map(|enhancer| {
                Box::new(move |create: StoreCreator<S, A>| enhancer(create))
                    as Transform<StoreCreator<S, A>>
            })
            .collect(),
    ));

    Arc::new(move |create: StoreCreator<S, A>| chain(create))
}

/// Middleware that logs every action through `tracing`.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<A: Action> Middleware<A> for Logger {
    fn wrap(&self, next: Dispatch<A>) -> Dispatch<A> {
        let name = self.name.clone();
        Arc::new(move |action: A| {
            let action_type = action
                .action_type()
                .map(Cow::into_owned)
                .unwrap_or_else(|| "<undefined>".to_string());
            tracing::debug!(middleware = %name, action = %action_type, "dispatch");

            let result = next(action);
            match &result {
                Ok(_) => tracing::debug!(middleware = %name, action = %action_type, "dispatch complete"),
                Err(err) => tracing::debug!(middleware = %name, action = %action_type, error = %err, "dispatch failed"),
            }
            result
        })
    }
}

/// A [`Logger`] named `"logger"`.
pub fn logger<A: Action>() -> Arc<dyn Middleware<A>> {
    Arc::new(Logger::new("logger"))
}
