//! Actions
//!
//! An action is a plain record describing an intended state change. It
//! carries a mandatory discriminant (its `type`) plus whatever payload the
//! application needs.
//!
//! Typed applications usually implement [`Action`] for an enum, in which case
//! both validation checks always pass. Dynamic applications can dispatch
//! `serde_json::Value` records or [`AnyAction`], and get the same validation
//! the store applies to untyped events: the value must be a record and its
//! `type` must be defined.

use std::borrow::Cow;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtocolViolation, Result};

/// Something that can be dispatched to a store.
pub trait Action: Send + 'static {
    /// The discriminant of this action. `None` means the type is undefined,
    /// which the store rejects.
    fn action_type(&self) -> Option<Cow<'_, str>>;

    /// Whether this value is a plain structured record.
    ///
    /// Typed actions are records by construction. Dynamic representations
    /// override this to reject primitives and arrays.
    fn is_plain_record(&self) -> bool {
        true
    }

    /// Build the action the store dispatches once at construction time.
    ///
    /// `action_type` is [`ActionTypes::init`]. Reducers are expected to fall
    /// through to their default branch for it.
    fn bootstrap(action_type: &str) -> Self;
}

/// Action types reserved by the store.
pub struct ActionTypes;

static INIT_TYPE: OnceLock<String> = OnceLock::new();

impl ActionTypes {
    const INIT_PREFIX: &'static str = "@@reflux/INIT";

    /// The bootstrap action type.
    ///
    /// Randomized once per process so no application constant can collide
    /// with it.
    pub fn init() -> &'static str {
        INIT_TYPE.get_or_init(|| {
            let nonce = uuid::Uuid::new_v4().simple().to_string();
            let dotted: Vec<String> = nonce.chars().take(8).map(String::from).collect();
            format!("{}.{}", Self::INIT_PREFIX, dotted.join("."))
        })
    }

    /// Check whether an action type belongs to the store.
    ///
    /// Only the prefix followed by its `.` separator counts, so look-alike
    /// application types such as `@@reflux/INITIALIZE` are not reserved.
    pub fn is_reserved(action_type: &str) -> bool {
        action_type
            .strip_prefix(Self::INIT_PREFIX)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// JSON records as actions.
///
/// A value is a plain record only if it is an object. Its type is undefined
/// when `type` is missing or JSON `null`; any other value is used through its
/// JSON rendering, so `{"type": 0}` has type `"0"`.
impl Action for Value {
    fn action_type(&self) -> Option<Cow<'_, str>> {
        match self.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
            Some(other) => Some(Cow::Owned(other.to_string())),
        }
    }

    fn is_plain_record(&self) -> bool {
        self.is_object()
    }

    fn bootstrap(action_type: &str) -> Self {
        serde_json::json!({ "type": action_type })
    }
}

/// A dynamically-typed action: a `type` plus arbitrary payload fields.
///
/// Serializes flat, so `{"type": "ADD", "amount": 2}` round-trips through
/// serde unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyAction {
    #[serde(rename = "type")]
    pub action_type: String,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl AnyAction {
    /// Create an action with the given type and no payload.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Validate a JSON value as an action.
    ///
    /// Fails with [`ProtocolViolation::NotPlainRecord`] for anything but an
    /// object and with [`ProtocolViolation::UndefinedType`] when `type` is
    /// missing or null. Non-string types are kept in their JSON rendering.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(ProtocolViolation::NotPlainRecord.into());
        };

        let action_type = match fields.remove("type") {
            None | Some(Value::Null) => return Err(ProtocolViolation::UndefinedType.into()),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        Ok(Self {
            action_type,
            payload: fields,
        })
    }

    /// Flatten back into a JSON record.
    pub fn into_value(self) -> Value {
        let mut fields = self.payload;
        fields.insert("type".to_string(), Value::String(self.action_type));
        Value::Object(fields)
    }
}

impl Action for AnyAction {
    fn action_type(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.action_type.as_str()))
    }

    fn bootstrap(action_type: &str) -> Self {
        Self::new(action_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_type_is_stable_and_reserved() {
        let first = ActionTypes::init();
        let second = ActionTypes::init();

        assert_eq!(first, second);
        assert!(first.starts_with("@@reflux/INIT."));
        assert!(ActionTypes::is_reserved(first));
        assert!(!ActionTypes::is_reserved("INCREASE"));
    }

    #[test]
    fn look_alike_types_are_not_reserved() {
        assert!(!ActionTypes::is_reserved("@@reflux/INITIALIZE"));
        assert!(!ActionTypes::is_reserved("@@reflux/INIT"));
        assert!(ActionTypes::is_reserved("@@reflux/INIT.a.b"));
    }

    #[test]
    fn json_value_validation() {
        assert!(json!({ "type": "INC" }).is_plain_record());
        assert!(!json!(3).is_plain_record());
        assert!(!json!(["INC"]).is_plain_record());

        assert_eq!(json!({ "type": "INC" }).action_type().as_deref(), Some("INC"));
        assert_eq!(json!({ "type": 7 }).action_type().as_deref(), Some("7"));
        assert!(json!({ "type": null }).action_type().is_none());
        assert!(json!({ "kind": "INC" }).action_type().is_none());
    }

    #[test]
    fn any_action_from_value() {
        let action = AnyAction::from_value(json!({ "type": "ADD", "amount": 2 })).unwrap();
        assert_eq!(action.action_type, "ADD");
        assert_eq!(action.get("amount"), Some(&json!(2)));
        assert!(action.get("type").is_none());

        assert_eq!(
            AnyAction::from_value(json!("ADD")),
            Err(ProtocolViolation::NotPlainRecord.into())
        );
        assert_eq!(
            AnyAction::from_value(json!({ "amount": 2 })),
            Err(ProtocolViolation::UndefinedType.into())
        );
    }

    #[test]
    fn any_action_serializes_flat() {
        let action = AnyAction::new("ADD").with("amount", 2);
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value, json!({ "type": "ADD", "amount": 2 }));

        let parsed: AnyAction = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed, action);
        assert_eq!(action.into_value(), value);
    }
}
