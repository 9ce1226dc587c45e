//! The validate-then-serialize pipeline every skill object goes through.

use serde_json::{Map, Value};

use crate::error::Result;

/// Something that can be checked against platform rules and turned into wire JSON.
pub trait Renderable {
    /// Fails with a typed error when the object breaks a platform rule.
    fn validate(&self) -> Result<()>;

    /// Serializes the object without validating it. Implementations may assume
    /// `validate` has already succeeded for `self` and everything it owns.
    fn to_wire(&self) -> Value;

    /// Validates, then serializes. Never returns partial output.
    fn render(&self) -> Result<Value> {
        render_with_validation(self)
    }
}

/// Something that can be rebuilt from the platform's inbound JSON.
pub trait Parseable: Sized {
    /// Builds the object from a mapping, substituting defaults for missing keys.
    fn from_mapping(data: &Value) -> Result<Self>;

    fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        Self::from_mapping(&value)
    }
}

/// Shared entry point for rendering: validation always runs first.
pub fn render_with_validation<R>(component: &R) -> Result<Value>
where
    R: Renderable + ?Sized,
{
    component.validate()?;
    Ok(component.to_wire())
}

/// Builder for wire objects that drops absent optional fields instead of emitting `null`.
#[derive(Debug, Default, Clone)]
pub struct WireObject {
    map: Map<String, Value>,
}

impl WireObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    pub fn optional<V>(mut self, key: &str, value: Option<V>) -> Self
    where
        V: Into<Value>,
    {
        if let Some(value) = value {
            self.map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Emits `key: true` only when the flag is set.
    pub fn flag(self, key: &str, value: bool) -> Self {
        self.optional(key, value.then_some(true))
    }

    pub fn nested<R>(self, key: &str, value: Option<&R>) -> Self
    where
        R: Renderable,
    {
        self.optional(key, value.map(Renderable::to_wire))
    }

    /// Emits the rendered list, or nothing when it is empty.
    pub fn list<R>(mut self, key: &str, items: &[R]) -> Self
    where
        R: Renderable,
    {
        if !items.is_empty() {
            let rendered = items.iter().map(Renderable::to_wire).collect();
            self.map.insert(key.to_string(), Value::Array(rendered));
        }
        self
    }

    /// Emits the mapping, or nothing when it is empty.
    pub fn mapping(mut self, key: &str, value: &Map<String, Value>) -> Self {
        if !value.is_empty() {
            self.map.insert(key.to_string(), Value::Object(value.clone()));
        }
        self
    }

    pub fn merge(mut self, other: Map<String, Value>) -> Self {
        self.map.extend(other);
        self
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}
