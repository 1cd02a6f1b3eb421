//! Actions: tagged records describing an intent to change state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved action kind issued synthetically, exactly once, when a reducer
/// or store is first wired up. A reducer answers it with its initial state.
pub const INIT_KIND: &str = "@@INIT";

/// An action dispatched through the store.
///
/// Identity is the `kind` tag; payload fields are action-specific and opaque
/// to the core. Actions cross task boundaries (async handlers dispatch
/// follow-ups), so they are `Clone + Send`.
///
/// # Example
/// ```
/// use reng_core::Action;
///
/// let action = Action::new("AddQuestion")
///     .with("subject", "ownership")
///     .with("body", "who moves what?");
/// assert_eq!(action.kind(), "AddQuestion");
/// assert_eq!(action.get("subject").unwrap(), "ownership");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Action {
    /// Create an action with the given kind and an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// The reserved initialization action.
    pub fn init() -> Self {
        Self::new(INIT_KIND)
    }

    /// Add a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// The action kind tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether this is the reserved initialization action.
    pub fn is_init(&self) -> bool {
        self.kind == INIT_KIND
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The `args` payload field, as produced by emit-style follow-ups.
    pub fn args(&self) -> Option<&Value> {
        self.payload.get("args")
    }

    /// All payload fields.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_accessors() {
        let action = Action::new("Increment").with("step", 2);
        assert_eq!(action.kind(), "Increment");
        assert_eq!(action.get("step"), Some(&json!(2)));
        assert!(action.get("missing").is_none());
        assert!(!action.is_init());
    }

    #[test]
    fn test_init_action() {
        let action = Action::init();
        assert!(action.is_init());
        assert_eq!(action.kind(), INIT_KIND);
        assert!(action.payload().is_empty());
    }

    #[test]
    fn test_serde_round_trip_uses_type_tag() {
        let action = Action::new("Save").with("id", 7);
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(encoded, json!({"type": "Save", "id": 7}));

        let decoded: Action = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, action);
    }
}
