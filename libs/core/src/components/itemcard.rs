//! Leaf objects that only appear inside an item card.

use serde_json::Value;

use crate::components::common::Link;
use crate::error::Result;
use crate::render::{Renderable, WireObject};
use crate::validate::require_text;

/// Item card image with optional pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemThumbnail {
    pub image_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub link: Option<Link>,
}

impl ItemThumbnail {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            width: None,
            height: None,
            link: None,
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }
}

impl Renderable for ItemThumbnail {
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
            .optional("width", self.width)
            .optional("height", self.height)
            .nested("link", self.link.as_ref())
            .build()
    }
}

/// Title block drawn over or next to the item card image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTitle {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ImageTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            image_url: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

impl Renderable for ImageTitle {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("title", self.title.as_str())
            .optional("description", self.description.as_deref())
            .optional("imageUrl", self.image_url.as_deref())
            .build()
    }
}

fn title_description(title: &str, description: &str) -> Result<()> {
    require_text("title", title)?;
    require_text("description", description)?;
    Ok(())
}

fn title_description_wire(title: &str, description: &str) -> Value {
    WireObject::new()
        .field("title", title)
        .field("description", description)
        .build()
}

/// One `title: description` row of an item card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub description: String,
}

impl Item {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl Renderable for Item {
    fn validate(&self) -> Result<()> {
        title_description(&self.title, &self.description)
    }

    fn to_wire(&self) -> Value {
        title_description_wire(&self.title, &self.description)
    }
}

/// Summary row rendered below the item list (for example a total).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListSummary {
    pub title: String,
    pub description: String,
}

impl ItemListSummary {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl Renderable for ItemListSummary {
    fn validate(&self) -> Result<()> {
        title_description(&self.title, &self.description)
    }

    fn to_wire(&self) -> Value {
        title_description_wire(&self.title, &self.description)
    }
}

/// Small profile line at the top of an item card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProfile {
    pub title: String,
    pub image_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ItemProfile {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_url: None,
            width: None,
            height: None,
        }
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

impl Renderable for ItemProfile {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("title", self.title.as_str())
            .optional("imageUrl", self.image_url.as_deref())
            .optional("width", self.width)
            .optional("height", self.height)
            .build()
    }
}
