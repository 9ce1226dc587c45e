//! Click actions shared by buttons, quick replies and list items.
//!
//! Which payload field an action needs is table-driven: [`Action::uses_fields`] returns the
//! required and optional [`ActionField`]s, and only those are validated and emitted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SkillError, ValueKind};
use crate::validate::{assert_type, require};

/// What happens when the user taps an interactive element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    WebLink,
    Message,
    Phone,
    Block,
    Share,
    Operator,
}

/// Payload fields an action can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionField {
    WebLinkUrl,
    MessageText,
    PhoneNumber,
    BlockId,
}

impl ActionField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ActionField::WebLinkUrl => "webLinkUrl",
            ActionField::MessageText => "messageText",
            ActionField::PhoneNumber => "phoneNumber",
            ActionField::BlockId => "blockId",
        }
    }
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::WebLink,
        Action::Message,
        Action::Phone,
        Action::Block,
        Action::Share,
        Action::Operator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::WebLink => "webLink",
            Action::Message => "message",
            Action::Phone => "phone",
            Action::Block => "block",
            Action::Share => "share",
            Action::Operator => "operator",
        }
    }

    /// `(required, optional)` payload fields for this action.
    ///
    /// ```
    /// use kskill_core::{Action, ActionField};
    ///
    /// let (required, optional) = Action::Block.uses_fields();
    /// assert_eq!(required, &[ActionField::BlockId]);
    /// assert_eq!(optional, &[ActionField::MessageText]);
    /// ```
    pub fn uses_fields(&self) -> (&'static [ActionField], &'static [ActionField]) {
        match self {
            Action::WebLink => (&[ActionField::WebLinkUrl], &[]),
            Action::Message => (&[ActionField::MessageText], &[]),
            Action::Phone => (&[ActionField::PhoneNumber], &[]),
            Action::Block => (&[ActionField::BlockId], &[ActionField::MessageText]),
            Action::Share | Action::Operator => (&[], &[]),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SkillError;

    /// Parses an action token case-insensitively (`"webLink"`, `"WEBLINK"`, `"Message"`).
    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| SkillError::InvalidAction(format!("unknown action `{token}`")))
    }
}

/// Raw payload fields that travel with an action.
///
/// Doubles as the "raw constructor arguments" form accepted by the `*_fields` add helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionFields {
    pub web_link_url: Option<String>,
    pub message_text: Option<String>,
    pub phone_number: Option<String>,
    pub block_id: Option<String>,
    pub extra: Option<Value>,
}

impl ActionFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn web_link_url(mut self, url: impl Into<String>) -> Self {
        self.web_link_url = Some(url.into());
        self
    }

    pub fn message_text(mut self, text: impl Into<String>) -> Self {
        self.message_text = Some(text.into());
        self
    }

    pub fn phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self
    }

    pub fn block_id(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn get(&self, field: ActionField) -> Option<&str> {
        match field {
            ActionField::WebLinkUrl => self.web_link_url.as_deref(),
            ActionField::MessageText => self.message_text.as_deref(),
            ActionField::PhoneNumber => self.phone_number.as_deref(),
            ActionField::BlockId => self.block_id.as_deref(),
        }
    }

    /// Checks `extra`, the action against `allowed`, and the action's required fields.
    /// With no action only `extra` is checked.
    pub fn validate_for(&self, action: Option<Action>, allowed: &[Action]) -> Result<()> {
        assert_type(ValueKind::Object, false, [("extra", self.extra.as_ref())])?;
        let Some(action) = action else {
            return Ok(());
        };
        if !allowed.contains(&action) {
            return Err(SkillError::InvalidAction(format!(
                "`{action}` is not one of {}",
                allowed
                    .iter()
                    .map(Action::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        let (required, _) = action.uses_fields();
        for field in required {
            require(field.wire_name(), self.get(*field), ValueKind::String)?;
        }
        Ok(())
    }

    /// Wire keys for `action`: the action token, its fields, and `extra` when present.
    pub fn wire_for(&self, action: Option<Action>) -> Map<String, Value> {
        let mut out = Map::new();
        let Some(action) = action else {
            return out;
        };
        out.insert("action".into(), Value::from(action.as_str()));
        let (required, optional) = action.uses_fields();
        for field in required.iter().chain(optional) {
            if let Some(value) = self.get(*field) {
                out.insert(field.wire_name().into(), Value::from(value));
            }
        }
        if let Some(extra) = &self.extra {
            out.insert("extra".into(), extra.clone());
        }
        out
    }
}
