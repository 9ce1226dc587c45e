//! Top-level envelopes returned to the platform: the skill response and the validation response.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::components::{
    BasicCard, Carousel, CommerceCard, ItemCard, ListCard, SimpleImage, SimpleText,
    SkillComponent, TextCard,
};
use crate::config::SkillLimits;
use crate::context::{Context, ContextParam};
use crate::error::{Result, SkillError, ValueKind};
use crate::interaction::{Action, ActionFields};
use crate::render::{Renderable, WireObject, render_with_validation};
use crate::telemetry::render_with_span;
use crate::validate::{assert_type, require_text};

pub const SKILL_RESPONSE_VERSION: &str = "2.0";

/// Suggestion chip shown below the outputs. Only `message` and `block` actions are allowed.
///
/// ```
/// use kskill_core::{QuickReply, Renderable};
/// use serde_json::json;
///
/// let reply = QuickReply::message("Yes", "yes please");
/// assert_eq!(
///     reply.render().unwrap(),
///     json!({"label": "Yes", "action": "message", "messageText": "yes please"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuickReply {
    pub label: String,
    pub action: Action,
    pub fields: ActionFields,
}

impl QuickReply {
    pub const ACTIONS: [Action; 2] = [Action::Message, Action::Block];

    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
            fields: ActionFields::default(),
        }
    }

    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(label, Action::Message).message_text(text)
    }

    pub fn block(label: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self::new(label, Action::Block).block_id(block_id)
    }

    /// Builds a quick reply from raw arguments. A missing action means `message`.
    pub fn from_fields(
        label: impl Into<String>,
        action: Option<&str>,
        fields: ActionFields,
    ) -> Result<Self> {
        let action = match action {
            Some(token) => token.parse()?,
            None => Action::Message,
        };
        Ok(Self {
            label: label.into(),
            action,
            fields,
        })
    }

    pub fn message_text(mut self, text: impl Into<String>) -> Self {
        self.fields.message_text = Some(text.into());
        self
    }

    pub fn block_id(mut self, block_id: impl Into<String>) -> Self {
        self.fields.block_id = Some(block_id.into());
        self
    }

    pub fn extra(mut self, extra: Value) -> Self {
        self.fields.extra = Some(extra);
        self
    }
}

impl Renderable for QuickReply {
    fn validate(&self) -> Result<()> {
        require_text("label", &self.label)?;
        self.fields.validate_for(Some(self.action), &Self::ACTIONS)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("label", self.label.as_str())
            .merge(self.fields.wire_for(Some(self.action)))
            .build()
    }
}

/// Any output that can appear in `template.outputs`.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    SimpleText(SimpleText),
    SimpleImage(SimpleImage),
    TextCard(TextCard),
    BasicCard(BasicCard),
    CommerceCard(CommerceCard),
    ListCard(ListCard),
    ItemCard(ItemCard),
    Carousel(Carousel),
}

macro_rules! component_variants {
    ($($variant:ident),+ $(,)?) => {
        impl Component {
            /// Wire name used as the key of this output.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Component::$variant(_) => <$variant as SkillComponent>::NAME,)+
                }
            }

            fn inner(&self) -> &dyn Renderable {
                match self {
                    $(Component::$variant(inner) => inner,)+
                }
            }
        }

        $(
            impl From<$variant> for Component {
                fn from(component: $variant) -> Self {
                    Component::$variant(component)
                }
            }
        )+
    };
}

component_variants!(
    SimpleText,
    SimpleImage,
    TextCard,
    BasicCard,
    CommerceCard,
    ListCard,
    ItemCard,
    Carousel,
);

impl Renderable for Component {
    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }

    /// Renders `{"<name>": {...}}`.
    fn to_wire(&self) -> Value {
        WireObject::new()
            .field(self.name(), self.inner().to_wire())
            .build()
    }
}

/// The skill response envelope.
///
/// ```
/// use kskill_core::{QuickReply, Renderable, SimpleText, SkillResponse};
/// use serde_json::json;
///
/// let mut response = SkillResponse::new();
/// response
///     .add_component(SimpleText::new("hello"))
///     .add_quick_reply(QuickReply::message("again", "hello"));
/// assert_eq!(
///     response.render().unwrap(),
///     json!({
///         "version": "2.0",
///         "template": {
///             "outputs": [{"simpleText": {"text": "hello"}}],
///             "quickReplies": [{"label": "again", "action": "message", "messageText": "hello"}]
///         }
///     })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillResponse {
    pub components: Vec<Component>,
    pub quick_replies: Vec<QuickReply>,
    pub contexts: Vec<Context>,
    pub data: Map<String, Value>,
    pub limits: SkillLimits,
}

impl SkillResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SkillLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// True when rendering would produce nothing but the version.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.quick_replies.is_empty()
            && self.contexts.is_empty()
            && self.data.is_empty()
    }

    pub fn add_component(&mut self, component: impl Into<Component>) -> &mut Self {
        self.components.push(component.into());
        self
    }

    pub fn add_quick_reply(&mut self, quick_reply: QuickReply) -> &mut Self {
        self.quick_replies.push(quick_reply);
        self
    }

    /// Builds a [`QuickReply`] from raw arguments and appends it.
    pub fn add_quick_reply_fields(
        &mut self,
        label: &str,
        action: Option<&str>,
        fields: ActionFields,
    ) -> Result<&mut Self> {
        let quick_reply = QuickReply::from_fields(label, action, fields)?;
        Ok(self.add_quick_reply(quick_reply))
    }

    pub fn add_quick_replies<I>(&mut self, quick_replies: I) -> &mut Self
    where
        I: IntoIterator<Item = QuickReply>,
    {
        self.quick_replies.extend(quick_replies);
        self
    }

    pub fn add_context(&mut self, context: Context) -> &mut Self {
        self.contexts.push(context);
        self
    }

    /// Builds a [`Context`] from raw arguments and appends it. Each param's resolved value
    /// is set to its value.
    pub fn add_context_fields<I, K, V>(
        &mut self,
        name: &str,
        lifespan: i64,
        ttl: Option<i64>,
        params: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut context = Context::new(name, lifespan);
        context.ttl = ttl;
        for (key, value) in params {
            let value = value.into();
            context
                .params
                .insert(key.into(), ContextParam::new(value.clone(), value));
        }
        self.add_context(context)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Appends the other response's components, quick replies and contexts, and its data keys.
    pub fn merge(&mut self, other: SkillResponse) -> &mut Self {
        self.components.extend(other.components);
        self.quick_replies.extend(other.quick_replies);
        self.contexts.extend(other.contexts);
        self.data.extend(other.data);
        self
    }

    /// Validates and serializes the envelope.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.render()?)?)
    }

    fn check_count(&self, what: &str, len: usize, max: usize) -> Result<()> {
        if len > max {
            return Err(SkillError::structural(format!(
                "a skill response holds at most {max} {what}, got {len}"
            )));
        }
        Ok(())
    }
}

impl Renderable for SkillResponse {
    fn validate(&self) -> Result<()> {
        self.check_count("outputs", self.components.len(), self.limits.max_outputs)?;
        self.check_count(
            "quick replies",
            self.quick_replies.len(),
            self.limits.max_quick_replies,
        )?;
        self.components.iter().try_for_each(Renderable::validate)?;
        self.quick_replies.iter().try_for_each(Renderable::validate)?;
        self.contexts.iter().try_for_each(Renderable::validate)
    }

    fn to_wire(&self) -> Value {
        let template = WireObject::new()
            .list("outputs", &self.components)
            .list("quickReplies", &self.quick_replies)
            .into_map();
        let context = (!self.contexts.is_empty())
            .then(|| WireObject::new().list("values", &self.contexts).build());
        WireObject::new()
            .field("version", SKILL_RESPONSE_VERSION)
            .mapping("template", &template)
            .optional("context", context)
            .mapping("data", &self.data)
            .build()
    }

    fn render(&self) -> Result<Value> {
        render_with_span("skill_response", || {
            tracing::debug!(
                outputs = self.components.len(),
                quick_replies = self.quick_replies.len(),
                contexts = self.contexts.len(),
                "rendering skill response"
            );
            render_with_validation(self)
        })
    }
}

impl Add for SkillResponse {
    type Output = SkillResponse;

    fn add(mut self, other: SkillResponse) -> SkillResponse {
        self.merge(other);
        self
    }
}

impl Add<Component> for SkillResponse {
    type Output = SkillResponse;

    fn add(mut self, component: Component) -> SkillResponse {
        self.add_component(component);
        self
    }
}

impl Add<QuickReply> for SkillResponse {
    type Output = SkillResponse;

    fn add(mut self, quick_reply: QuickReply) -> SkillResponse {
        self.add_quick_reply(quick_reply);
        self
    }
}

impl Add<Context> for SkillResponse {
    type Output = SkillResponse;

    fn add(mut self, context: Context) -> SkillResponse {
        self.add_context(context);
        self
    }
}

/// Outcome reported back to the slot-filling validation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Success,
    Fail,
    Error,
    Ignore,
}

impl ValidationStatus {
    pub const ALL: [ValidationStatus; 4] = [
        ValidationStatus::Success,
        ValidationStatus::Fail,
        ValidationStatus::Error,
        ValidationStatus::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Success => "SUCCESS",
            ValidationStatus::Fail => "FAIL",
            ValidationStatus::Error => "ERROR",
            ValidationStatus::Ignore => "IGNORE",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = SkillError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        ValidationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| {
                SkillError::InvalidPayload(format!("unknown validation status `{token}`"))
            })
    }
}

/// Response to a validation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResponse {
    pub status: ValidationStatus,
    pub value: Option<String>,
    pub data: Option<Value>,
    pub message: Option<String>,
}

impl Default for ValidationResponse {
    fn default() -> Self {
        Self::new(ValidationStatus::Success)
    }
}

impl ValidationResponse {
    pub fn new(status: ValidationStatus) -> Self {
        Self {
            status,
            value: None,
            data: None,
            message: None,
        }
    }

    pub fn success(value: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Success).value(value)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Fail).message(message)
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.render()?)?)
    }
}

impl Renderable for ValidationResponse {
    fn validate(&self) -> Result<()> {
        assert_type(ValueKind::Object, false, [("data", self.data.as_ref())])
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("status", self.status.as_str())
            .optional("value", self.value.as_deref())
            .optional("data", self.data.clone())
            .optional("message", self.message.as_deref())
            .build()
    }

    fn render(&self) -> Result<Value> {
        render_with_span("validation_response", || render_with_validation(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ListCard, ListItem, Thumbnail};
    use serde_json::json;

    #[test]
    fn empty_response_renders_version_only() {
        let response = SkillResponse::new();
        assert!(response.is_empty());
        assert_eq!(response.render().unwrap(), json!({"version": "2.0"}));
    }

    #[test]
    fn data_alone_makes_a_response_non_empty() {
        let mut response = SkillResponse::new();
        response.set_data("k", "v");
        assert!(!response.is_empty());
        assert_eq!(
            response.render().unwrap(),
            json!({"version": "2.0", "data": {"k": "v"}})
        );
    }

    #[test]
    fn output_and_quick_reply_caps() {
        let mut response = SkillResponse::new();
        for n in 0..3 {
            response.add_component(SimpleText::new(format!("{n}")));
        }
        assert!(response.validate().is_ok());
        response.add_component(SimpleText::new("fourth"));
        assert!(matches!(
            response.render(),
            Err(SkillError::StructuralViolation(_))
        ));

        let mut response = SkillResponse::new();
        response.add_quick_replies((0..11).map(|n| QuickReply::message(format!("{n}"), "go")));
        assert!(response.validate().is_err());
        response.quick_replies.pop();
        assert!(response.validate().is_ok());
    }

    #[test]
    fn limits_are_configurable() {
        let limits = SkillLimits {
            max_outputs: 1,
            ..SkillLimits::default()
        };
        let mut response = SkillResponse::with_limits(limits);
        response
            .add_component(SimpleText::new("a"))
            .add_component(SimpleText::new("b"));
        assert!(response.validate().is_err());
    }

    #[test]
    fn quick_reply_defaults_to_message() {
        let reply =
            QuickReply::from_fields("Hi", None, ActionFields::new().message_text("hi")).unwrap();
        assert_eq!(reply, QuickReply::message("Hi", "hi"));
        let phone = QuickReply::from_fields(
            "Call",
            Some("phone"),
            ActionFields::new().phone_number("1"),
        )
        .unwrap();
        assert!(matches!(
            phone.validate(),
            Err(SkillError::InvalidAction(_))
        ));
    }

    #[test]
    fn raw_and_prebuilt_quick_replies_render_the_same() {
        let mut built = SkillResponse::new();
        built.add_quick_reply(QuickReply::block("Menu", "b1").message_text("menu"));
        let mut raw = SkillResponse::new();
        raw.add_quick_reply_fields(
            "Menu",
            Some("BLOCK"),
            ActionFields::new().block_id("b1").message_text("menu"),
        )
        .unwrap();
        assert_eq!(built.render().unwrap(), raw.render().unwrap());
    }

    #[test]
    fn contexts_render_under_values() {
        let mut response = SkillResponse::new();
        response.add_context_fields("order", 2, Some(60), [("menu", "latte")]);
        assert_eq!(
            response.render().unwrap(),
            json!({
                "version": "2.0",
                "context": {"values": [
                    {"name": "order", "lifeSpan": 2, "ttl": 60, "params": {"menu": "latte"}}
                ]}
            })
        );
        assert_eq!(
            response.contexts[0],
            Context::new("order", 2).ttl(60).param("menu", "latte")
        );
    }

    #[test]
    fn outputs_are_keyed_by_wire_name() {
        let mut list = ListCard::new("Menu");
        list.add_item(ListItem::new("Latte"));
        let mut response = SkillResponse::new();
        response
            .add_component(list)
            .add_component(BasicCard::new(Thumbnail::new("https://example.com/a.png")));
        let rendered = response.render().unwrap();
        let outputs = rendered["template"]["outputs"].as_array().unwrap();
        assert!(outputs[0].get("listCard").is_some());
        assert!(outputs[1].get("basicCard").is_some());
    }

    #[test]
    fn adding_responses_merges_them() {
        let mut first = SkillResponse::new();
        first.add_component(SimpleText::new("one"));
        let mut second = SkillResponse::new();
        second
            .add_component(SimpleText::new("two"))
            .add_quick_reply(QuickReply::message("q", "q"));
        let merged = first + second + Context::new("c", 1);
        assert_eq!(merged.components.len(), 2);
        assert_eq!(merged.quick_replies.len(), 1);
        assert_eq!(merged.contexts.len(), 1);
        let merged = merged + Component::from(SimpleText::new("three"));
        assert_eq!(merged.components[2].name(), "simpleText");
    }

    #[test]
    fn invalid_component_fails_the_whole_response() {
        let mut response = SkillResponse::new();
        response.add_component(TextCard::new());
        assert_eq!(response.render().unwrap_err(), response.validate().unwrap_err());
        assert!(response.to_json().is_err());
    }

    #[test]
    fn validation_response_renders_present_fields() {
        let response = ValidationResponse::success("latte");
        assert_eq!(
            response.render().unwrap(),
            json!({"status": "SUCCESS", "value": "latte"})
        );
        let failed = ValidationResponse::fail("unknown menu").data(json!({"hint": "try latte"}));
        assert_eq!(
            failed.render().unwrap(),
            json!({"status": "FAIL", "message": "unknown menu", "data": {"hint": "try latte"}})
        );
        let bad = ValidationResponse::default().data(json!([1]));
        assert!(matches!(bad.render(), Err(SkillError::TypeMismatch { .. })));
    }

    #[test]
    fn validation_status_parses_case_insensitively() {
        assert_eq!(
            "ignore".parse::<ValidationStatus>().unwrap(),
            ValidationStatus::Ignore
        );
        assert!("maybe".parse::<ValidationStatus>().is_err());
    }
}
