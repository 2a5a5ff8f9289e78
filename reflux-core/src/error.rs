//! Error Types
//!
//! Every failure in the store and binding layer is synchronous and surfaced
//! directly to the caller. Nothing here is retried.
//!
//! Errors fall into two families:
//!
//! - [`ConfigurationError`]: the store or the component tree was wired
//!   incorrectly (no reducer, no provider in scope).
//! - [`ProtocolViolation`]: a caller broke the dispatch protocol (malformed
//!   action, re-entrant dispatch, reading or (un)subscribing while the reducer
//!   runs).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Invalid construction arguments or a missing provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("expected a reducer; the store config has none")]
    MissingReducer,

    #[error(
        "could not find store context value for `{type_name}`; \
         please ensure the component is wrapped in a provider"
    )]
    NoProvider { type_name: &'static str },
}

/// A caller broke the dispatch protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("actions must be plain records; use custom middleware for anything else")]
    NotPlainRecord,

    #[error("actions may not have an undefined \"type\" property; have you misspelled a constant?")]
    UndefinedType,

    #[error("reducers may not dispatch actions")]
    ReducerDispatched,

    #[error(
        "you may not call get_state() while the reducer is executing; \
         the reducer has already received the state as an argument"
    )]
    GetStateWhileDispatching,

    #[error(
        "you may not call subscribe() while the reducer is executing; \
         subscribe from a component and read the state in the callback instead"
    )]
    SubscribeWhileDispatching,

    #[error("you may not unsubscribe from a store listener while the reducer is executing")]
    UnsubscribeWhileDispatching,
}

/// Top-level error for store and binding operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
}

impl StoreError {
    /// True for wiring mistakes made at construction or lookup time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, StoreError::Configuration(_))
    }

    /// True for misuse of the dispatch protocol.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, StoreError::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_into_store_error() {
        let err: StoreError = ProtocolViolation::ReducerDispatched.into();
        assert!(err.is_protocol_violation());
        assert!(!err.is_configuration());

        let err: StoreError = ConfigurationError::MissingReducer.into();
        assert!(err.is_configuration());
    }

    #[test]
    fn no_provider_message_names_the_type() {
        let err = StoreError::from(ConfigurationError::NoProvider { type_name: "Store<u32>" });
        let message = err.to_string();
        assert!(message.contains("Store<u32>"));
        assert!(message.contains("provider"));
    }
}
