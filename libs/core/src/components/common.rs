//! Leaf elements shared by several cards: links, thumbnails, profiles, buttons, list rows.

use serde_json::Value;
use url::Url;

use crate::error::{Result, SkillError};
use crate::interaction::{Action, ActionFields};
use crate::render::{Renderable, WireObject};
use crate::validate::require_text;

/// Target URLs for a clickable element. `web` wins over the device-specific links.
///
/// ```
/// use kskill_core::{Link, Renderable};
/// use serde_json::json;
///
/// let link = Link::web("https://www.example.com");
/// assert_eq!(link.render().unwrap(), json!({"web": "https://www.example.com"}));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub web: Option<String>,
    pub pc: Option<String>,
    pub mobile: Option<String>,
}

impl Link {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn web(url: impl Into<String>) -> Self {
        Self::new().with_web(url)
    }

    pub fn with_web(mut self, url: impl Into<String>) -> Self {
        self.web = Some(url.into());
        self
    }

    pub fn with_pc(mut self, url: impl Into<String>) -> Self {
        self.pc = Some(url.into());
        self
    }

    pub fn with_mobile(mut self, url: impl Into<String>) -> Self {
        self.mobile = Some(url.into());
        self
    }

    fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("web", self.web.as_deref()),
            ("pc", self.pc.as_deref()),
            ("mobile", self.mobile.as_deref()),
        ]
    }
}

impl Renderable for Link {
    fn validate(&self) -> Result<()> {
        let present: Vec<_> = self
            .entries()
            .into_iter()
            .filter_map(|(name, url)| url.map(|url| (name, url)))
            .collect();
        if present.is_empty() {
            return Err(SkillError::InvalidLink(
                "link needs at least one of web, pc or mobile".into(),
            ));
        }
        for (name, url) in present {
            Url::parse(url)
                .map_err(|err| SkillError::InvalidLink(format!("{name} `{url}`: {err}")))?;
        }
        Ok(())
    }

    fn to_wire(&self) -> Value {
        self.entries()
            .into_iter()
            .fold(WireObject::new(), |out, (name, url)| out.optional(name, url))
            .build()
    }
}

/// Card image used by basic and commerce cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub image_url: String,
    pub link: Option<Link>,
    pub fixed_ratio: bool,
}

impl Thumbnail {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            link: None,
            fixed_ratio: false,
        }
    }

    pub fn link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }

    pub fn fixed_ratio(mut self, fixed_ratio: bool) -> Self {
        self.fixed_ratio = fixed_ratio;
        self
    }
}

impl Renderable for Thumbnail {
    fn validate(&self) -> Result<()> {
        require_text("imageUrl", &self.image_url)?;
        if let Some(link) = &self.link {
            link.validate()?;
        }
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("imageUrl", self.image_url.as_str())
            .flag("fixedRatio", self.fixed_ratio)
            .nested("link", self.link.as_ref())
            .build()
    }
}

/// Seller or author shown on a commerce card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub nickname: String,
    pub image_url: Option<String>,
}

impl Profile {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            image_url: None,
        }
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

impl Renderable for Profile {
    fn validate(&self) -> Result<()> {
        require_text("nickname", &self.nickname)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("nickname", self.nickname.as_str())
            .optional("imageUrl", self.image_url.as_deref())
            .build()
    }
}

/// Card button. Any [`Action`] is allowed; the action decides which field is required.
///
/// ```
/// use kskill_core::{Action, Button, Renderable};
/// use serde_json::json;
///
/// let button = Button::new("Call us", Action::Phone).phone_number("1588-0000");
/// assert_eq!(
///     button.render().unwrap(),
///     json!({"label": "Call us", "action": "phone", "phoneNumber": "1588-0000"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: Action,
    pub fields: ActionFields,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
            fields: ActionFields::default(),
        }
    }

    /// Builds a button from raw arguments; the action token is parsed case-insensitively.
    pub fn from_fields(label: impl Into<String>, action: &str, fields: ActionFields) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            action: action.parse()?,
            fields,
        })
    }

    pub fn web_link_url(mut self, url: impl Into<String>) -> Self {
        self.fields.web_link_url = Some(url.into());
        self
    }

    pub fn message_text(mut self, text: impl Into<String>) -> Self {
        self.fields.message_text = Some(text.into());
        self
    }

    pub fn phone_number(mut self, number: impl Into<String>) -> Self {
        self.fields.phone_number = Some(number.into());
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

impl Renderable for Button {
    fn validate(&self) -> Result<()> {
        require_text("label", &self.label)?;
        self.fields.validate_for(Some(self.action), &Action::ALL)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("label", self.label.as_str())
            .merge(self.fields.wire_for(Some(self.action)))
            .build()
    }
}

/// Row of a list card (also used as its header). Clickable rows take `block` or `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<Link>,
    pub action: Option<Action>,
    pub fields: ActionFields,
}

/// Raw arguments accepted by [`ListItem::from_fields`] and `ListCard::add_item_fields`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItemFields {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<Link>,
    pub action: Option<String>,
    pub block_id: Option<String>,
    pub message_text: Option<String>,
    pub extra: Option<Value>,
}

impl ListItem {
    pub const ACTIONS: [Action; 2] = [Action::Block, Action::Message];

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            image_url: None,
            link: None,
            action: None,
            fields: ActionFields::default(),
        }
    }

    pub fn from_fields(title: impl Into<String>, fields: ListItemFields) -> Result<Self> {
        let action = fields.action.as_deref().map(str::parse).transpose()?;
        Ok(Self {
            title: title.into(),
            description: fields.description,
            image_url: fields.image_url,
            link: fields.link,
            action,
            fields: ActionFields {
                block_id: fields.block_id,
                message_text: fields.message_text,
                extra: fields.extra,
                ..ActionFields::default()
            },
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn block_id(mut self, block_id: impl Into<String>) -> Self {
        self.fields.block_id = Some(block_id.into());
        self
    }

    pub fn message_text(mut self, text: impl Into<String>) -> Self {
        self.fields.message_text = Some(text.into());
        self
    }

    pub fn extra(mut self, extra: Value) -> Self {
        self.fields.extra = Some(extra);
        self
    }
}

impl Renderable for ListItem {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        if let Some(link) = &self.link {
            link.validate()?;
        }
        self.fields.validate_for(self.action, &Self::ACTIONS)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("title", self.title.as_str())
            .optional("description", self.description.as_deref())
            .optional("imageUrl", self.image_url.as_deref())
            .nested("link", self.link.as_ref())
            .merge(self.fields.wire_for(self.action))
            .build()
    }
}
