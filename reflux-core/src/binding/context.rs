//! Context Scopes
//!
//! A [`Context`] carries values down a component tree without threading them
//! through every constructor. Each component receives the context of its
//! parent; a provider creates a child scope holding a new value.
//!
//! # Implementation
//!
//! Scopes form a linked list from leaf to root. Looking a value up walks the
//! list until a scope holding that type is found, so the nearest provider
//! wins. Scopes are immutable once created and shared through `Arc`, which
//! makes cloning a context cheap.
//!
//! Unlike an ambient "current component" lookup, the scope is always passed
//! explicitly, so ownership of the store stays visible at every call site.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{ConfigurationError, Result};
use crate::store::{Action, Store};

struct Scope {
    parent: Option<Arc<Scope>>,
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// A scope in the component tree.
#[derive(Clone)]
pub struct Context {
    scope: Arc<Scope>,
}

impl Context {
    /// An empty root scope.
    pub fn root() -> Self {
        Self {
            scope: Arc::new(Scope {
                parent: None,
                values: HashMap::new(),
            }),
        }
    }

    /// An empty child scope.
    pub fn child(&self) -> Self {
        Self {
            scope: Arc::new(Scope {
                parent: Some(Arc::clone(&self.scope)),
                values: HashMap::new(),
            }),
        }
    }

    /// A child scope providing `value` to every descendant.
    pub fn provide<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut values: HashMap<TypeId, Arc<dyn Any + Send + Sync>> = HashMap::new();
        values.insert(TypeId::of::<T>(), Arc::new(value));

        Self {
            scope: Arc::new(Scope {
                parent: Some(Arc::clone(&self.scope)),
                values,
            }),
        }
    }

    /// A child scope providing `store`. This is the provider component of
    /// the binding layer.
    pub fn provide_store<S, A>(&self, store: Store<S, A>) -> Self
    where
        S: Send + Sync + 'static,
        A: Action,
    {
        self.provide(store)
    }

    /// The nearest value of type `T`, if any scope provides one.
    pub fn get<T>(&self) -> Option<T>
    where
        T: Any + Send + Sync + Clone,
    {
        let key = TypeId::of::<T>();
        let mut scope = Some(&self.scope);

        while let Some(current) = scope {
            if let Some(value) = current.values.get(&key) {
                return value.downcast_ref::<T>().cloned();
            }
            scope = current.parent.as_ref();
        }

        None
    }

    /// Number of ancestors above this scope.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self.scope.parent.as_ref();
        while let Some(current) = scope {
            depth += 1;
            scope = current.parent.as_ref();
        }
        depth
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::root()
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .field("local_values", &self.scope.values.len())
            .finish()
    }
}

/// Resolve the store provided to this scope.
///
/// Fails with [`ConfigurationError::NoProvider`] if no ancestor scope
/// provides a store of this type.
pub fn use_store<S, A>(ctx: &Context) -> Result<Store<S, A>>
where
    S: Send + Sync + 'static,
    A: Action,
{
    ctx.get::<Store<S, A>>().ok_or_else(|| {
        ConfigurationError::NoProvider {
            type_name: type_name::<Store<S, A>>(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    use crate::error::StoreError;
    use crate::store::{create_store, StoreConfig};

    fn number_store(start: i64) -> Store<i64, Value> {
        create_store(StoreConfig::new(|state: Option<&i64>, _: &Value| state.copied().unwrap_or(0))
            .with_preloaded_state(start))
        .unwrap()
    }

    #[test]
    fn values_reach_descendants() {
        let root = Context::root();
        let provided = root.provide(42u32);
        let grandchild = provided.child().child();

        assert_eq!(grandchild.get::<u32>(), Some(42));
        assert_eq!(grandchild.depth(), 3);
        assert_eq!(root.get::<u32>(), None);
    }

    #[test]
    fn nearest_provider_wins() {
        let outer = Context::root().provide("outer".to_string());
        let inner = outer.child().provide("inner".to_string());

        assert_eq!(inner.get::<String>().as_deref(), Some("inner"));
        assert_eq!(outer.get::<String>().as_deref(), Some("outer"));
    }

    #[test]
    fn use_store_finds_provided_store() {
        let store = number_store(5);
        let ctx = Context::root().provide_store(store.clone()).child();

        let found = use_store::<i64, Value>(&ctx).unwrap();
        assert!(found.same_store(&store));
        assert_eq!(*found.get_state().unwrap(), 5);
    }

    #[test]
    fn use_store_without_provider_fails() {
        let err = use_store::<i64, Value>(&Context::root().child()).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            StoreError::Configuration(ConfigurationError::NoProvider { .. })
        ));
    }

    #[test]
    fn store_types_do_not_collide() {
        let ctx = Context::root().provide_store(number_store(1));

        assert!(use_store::<i64, Value>(&ctx).is_ok());
        assert!(use_store::<u8, Value>(&ctx).is_err());
    }
}
