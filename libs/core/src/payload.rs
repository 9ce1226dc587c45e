//! Inbound requests: the skill payload and the slot-filling validation payload.
//!
//! Every key is optional on the wire; missing keys and explicit `null`s fall back to empty
//! values.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::Result;
use crate::render::Parseable;

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Value of a detail param: plain text, or a structured entity for system types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Object(Map<String, Value>),
    Other(Value),
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::Text(String::new())
    }
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            ParamValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Param {
    #[serde(deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: ParamValue,
    #[serde(deserialize_with = "null_as_default")]
    pub group_name: String,
}

/// Block action that triggered the skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillAction {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub detail_params: BTreeMap<String, Param>,
    #[serde(deserialize_with = "null_as_default")]
    pub client_extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bot {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Knowledge-base answer matched by the intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Knowledge {
    #[serde(deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub landing_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentExtra {
    #[serde(deserialize_with = "null_as_default")]
    pub reason: Map<String, Value>,
    #[serde(alias = "matchedKnowledges", deserialize_with = "null_as_default")]
    pub matched_knowledges: Vec<Knowledge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: IntentExtra,
}

/// Known user properties; anything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProperties {
    #[serde(deserialize_with = "null_as_default")]
    pub plusfriend_user_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub app_user_id: String,
    pub is_friend: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub properties: UserProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub block: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub utterance: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lang: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: User,
    pub params: Option<Map<String, Value>>,
    pub callback_url: Option<String>,
}

/// Skill request sent by the platform when a block calls the skill.
///
/// ```
/// use kskill_core::{Parseable, Payload};
///
/// let payload = Payload::from_json(
///     r#"{"userRequest": {"utterance": "hi", "user": {"id": "u1", "type": "botUserKey"}}}"#,
/// )
/// .unwrap();
/// assert_eq!(payload.user_id(), "u1");
/// assert_eq!(payload.utterance(), "hi");
/// assert!(payload.contexts.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Payload {
    #[serde(deserialize_with = "null_as_default")]
    pub intent: Intent,
    #[serde(deserialize_with = "null_as_default")]
    pub user_request: UserRequest,
    #[serde(deserialize_with = "null_as_default")]
    pub bot: Bot,
    #[serde(deserialize_with = "null_as_default")]
    pub action: SkillAction,
    #[serde(deserialize_with = "null_as_default")]
    pub contexts: Vec<Context>,
}

impl Payload {
    pub fn user_id(&self) -> &str {
        &self.user_request.user.id
    }

    pub fn utterance(&self) -> &str {
        &self.user_request.utterance
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.action.params
    }

    pub fn detail_params(&self) -> &BTreeMap<String, Param> {
        &self.action.detail_params
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|context| context.name == name)
    }

    /// Callback URL for callback-enabled blocks.
    pub fn callback_url(&self) -> Option<&str> {
        self.user_request.callback_url.as_deref()
    }
}

impl Parseable for Payload {
    fn from_mapping(data: &Value) -> Result<Self> {
        let payload = Payload::deserialize(data)?;
        let block = payload
            .user_request
            .block
            .get("id")
            .and_then(Value::as_str);
        tracing::trace!(
            block,
            contexts = payload.contexts.len(),
            "parsed skill payload"
        );
        Ok(payload)
    }
}

/// Request sent to a validation skill while a slot is being filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub bot: Bot,
    #[serde(deserialize_with = "null_as_default")]
    pub is_in_slot_filling: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub lang: String,
    #[serde(deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: User,
    #[serde(deserialize_with = "null_as_default")]
    pub utterance: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: Map<String, Value>,
}

impl ValidationPayload {
    /// `value.origin`, the raw text being validated.
    pub fn origin(&self) -> Option<&str> {
        self.value.get("origin").and_then(Value::as_str)
    }
}

impl Parseable for ValidationPayload {
    fn from_mapping(data: &Value) -> Result<Self> {
        Ok(ValidationPayload::deserialize(data)?)
    }
}
