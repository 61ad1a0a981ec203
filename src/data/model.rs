use crate::ast::Value;
use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use std::fs;
use std::path::Path;

/// The variables a run evaluates its conditions against.
///
/// Values are restricted to scalars (numbers, booleans, strings and null) and keep
/// their insertion order, which is also the order in which they are substituted into
/// condition expressions.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "Map<String, serde_json::Value>", into = "Map<String, serde_json::Value>")]
pub struct ExecutionContext {
    variables: Map<String, serde_json::Value>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample variables used when a run is started without a context.
    pub fn demo() -> Self {
        let mut variables = Map::new();
        variables.insert("value".to_string(), json!(15));
        variables.insert("count".to_string(), json!(3));
        variables.insert("x".to_string(), json!(10));
        Self { variables }
    }

    /// Parses a context from a JSON object.
    pub fn from_json_str(content: &str) -> Result<Self, ContextError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        match value {
            serde_json::Value::Object(map) => Self::try_from(map),
            _ => Err(ContextError::NotAnObject),
        }
    }

    /// Load a context from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Sets a variable, replacing any previous value while keeping its position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<(), ContextError> {
        let name = name.into();
        let value = value.into();
        if value.is_array() || value.is_object() {
            return Err(ContextError::NonScalar { name });
        }
        self.variables.insert(name, value);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, ContextError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.variables.get(name).and_then(Value::from_json)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Compact JSON rendering, e.g. `{"value":15,"count":3,"x":10}`.
    pub fn to_json_string(&self) -> String {
        serde_json::Value::Object(self.variables.clone()).to_string()
    }
}

impl TryFrom<Map<String, serde_json::Value>> for ExecutionContext {
    type Error = ContextError;

    fn try_from(map: Map<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let mut context = Self::new();
        for (name, value) in map {
            context.insert(name, value)?;
        }
        Ok(context)
    }
}

impl From<ExecutionContext> for Map<String, serde_json::Value> {
    fn from(context: ExecutionContext) -> Self {
        context.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_context_renders_in_insertion_order() {
        assert_eq!(
            ExecutionContext::demo().to_json_string(),
            r#"{"value":15,"count":3,"x":10}"#
        );
    }

    #[test]
    fn rejects_non_scalar_values() {
        let err = ExecutionContext::from_json_str(r#"{"ok": 1, "list": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ContextError::NonScalar { ref name } if name == "list"));

        let err = ExecutionContext::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ContextError::NotAnObject));
    }

    #[test]
    fn converts_scalars_to_values() {
        let ctx = ExecutionContext::new()
            .with("flag", true)
            .and_then(|c| c.with("name", "pump"))
            .and_then(|c| c.with("nothing", serde_json::Value::Null))
            .unwrap();
        assert_eq!(ctx.get("flag"), Some(Value::Bool(true)));
        assert_eq!(ctx.get("name"), Some(Value::Str("pump".into())));
        assert_eq!(ctx.get("nothing"), Some(Value::Null));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn deserializes_through_validation() {
        let ctx: ExecutionContext = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(ctx.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), ["b", "a"]);
        assert!(serde_json::from_str::<ExecutionContext>(r#"{"a": {"b": 1}}"#).is_err());
    }
}
