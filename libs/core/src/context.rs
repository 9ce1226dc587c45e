//! Conversational context shared by inbound payloads and outbound responses.
//!
//! Inbound contexts carry `lifespan` and `{value, resolvedValue}` params; outbound contexts are
//! rendered with `lifeSpan` and each param reduced to its `value`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, SkillError, ValueKind};
use crate::render::{Parseable, Renderable, WireObject};
use crate::validate::{assert_int, assert_string, assert_type, require_text};

/// One named context slot value.
///
/// ```
/// use kskill_core::{ContextParam, Renderable};
/// use serde_json::json;
///
/// let param = ContextParam::new("v", "r");
/// assert_eq!(param.render().unwrap(), json!("v"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextParam {
    pub value: String,
    pub resolved_value: String,
}

impl ContextParam {
    pub fn new(value: impl Into<String>, resolved_value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            resolved_value: resolved_value.into(),
        }
    }
}

impl Renderable for ContextParam {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn to_wire(&self) -> Value {
        Value::String(self.value.clone())
    }
}

impl Parseable for ContextParam {
    /// Accepts the inbound `{value, resolvedValue}` object or the outbound bare string.
    fn from_mapping(data: &Value) -> Result<Self> {
        if let Value::String(value) = data {
            return Ok(Self::new(value.as_str(), value.as_str()));
        }
        let map = as_object(data, "context param")?;
        let value = map.get("value");
        let resolved = map
            .get("resolvedValue")
            .or_else(|| map.get("resolved_value"));
        assert_string(false, [("value", value), ("resolvedValue", resolved)])?;
        Ok(Self {
            value: string_or_default(value),
            resolved_value: string_or_default(resolved),
        })
    }
}

/// Named context with a lifespan counter and optional ttl in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Context {
    pub name: String,
    pub lifespan: i64,
    pub ttl: Option<i64>,
    pub params: BTreeMap<String, ContextParam>,
}

impl Context {
    pub fn new(name: impl Into<String>, lifespan: i64) -> Self {
        Self {
            name: name.into(),
            lifespan,
            ttl: None,
            params: BTreeMap::new(),
        }
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Adds a param whose resolved value equals its value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.params
            .insert(key.into(), ContextParam::new(value.clone(), value));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, param: ContextParam) -> Self {
        self.params.insert(key.into(), param);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextParam> {
        self.params.get(key)
    }
}

impl Renderable for Context {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        if self.lifespan < 0 {
            return Err(SkillError::type_mismatch(
                format!("lifeSpan ({})", self.lifespan),
                ValueKind::NonNegativeInteger,
            ));
        }
        if let Some(ttl) = self.ttl
            && ttl < 0
        {
            return Err(SkillError::type_mismatch(
                format!("ttl ({ttl})"),
                ValueKind::NonNegativeInteger,
            ));
        }
        Ok(())
    }

    fn to_wire(&self) -> Value {
        let params: Map<String, Value> = self
            .params
            .iter()
            .map(|(key, param)| (key.clone(), param.to_wire()))
            .collect();
        WireObject::new()
            .field("name", self.name.as_str())
            .field("lifeSpan", self.lifespan)
            .optional("ttl", self.ttl)
            .mapping("params", &params)
            .build()
    }
}

impl Parseable for Context {
    fn from_mapping(data: &Value) -> Result<Self> {
        let map = as_object(data, "context")?;
        let name = map.get("name");
        let lifespan = map.get("lifespan").or_else(|| map.get("lifeSpan"));
        let ttl = map.get("ttl");
        assert_string(false, [("name", name)])?;
        assert_int(false, [("lifespan", lifespan), ("ttl", ttl)])?;
        let raw_params = map.get("params");
        assert_type(ValueKind::Object, false, [("params", raw_params)])?;

        let mut params = BTreeMap::new();
        if let Some(Value::Object(raw)) = raw_params {
            for (key, value) in raw {
                params.insert(key.clone(), ContextParam::from_mapping(value)?);
            }
        }
        Ok(Self {
            name: string_or_default(name),
            lifespan: lifespan.and_then(Value::as_i64).unwrap_or_default(),
            ttl: ttl.and_then(Value::as_i64),
            params,
        })
    }
}

impl TryFrom<Value> for Context {
    type Error = SkillError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_mapping(&value)
    }
}

fn as_object<'a>(data: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    data.as_object()
        .ok_or_else(|| SkillError::InvalidPayload(format!("{what} must be a JSON object")))
}

fn string_or_default(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
