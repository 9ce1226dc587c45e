//! Non-card outputs and the horizontal carousel.

use serde_json::Value;

use crate::components::SkillComponent;
use crate::components::card::{BasicCard, CommerceCard, ItemCard, ListCard, TextCard};
use crate::error::{Result, SkillError};
use crate::render::{Renderable, WireObject};
use crate::validate::require_text;

/// Plain speech bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleText {
    pub text: String,
}

impl SimpleText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Renderable for SimpleText {
    fn validate(&self) -> Result<()> {
        require_text("text", &self.text)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new().field("text", self.text.as_str()).build()
    }
}

impl SkillComponent for SimpleText {
    const NAME: &'static str = "simpleText";
}

/// Single image with alternative text for clients that cannot show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleImage {
    pub image_url: String,
    pub alt_text: String,
}

impl SimpleImage {
    pub fn new(image_url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            alt_text: alt_text.into(),
        }
    }
}

impl Renderable for SimpleImage {
    fn validate(&self) -> Result<()> {
        require_text("imageUrl", &self.image_url)?;
        require_text("altText", &self.alt_text)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("imageUrl", self.image_url.as_str())
            .field("altText", self.alt_text.as_str())
            .build()
    }
}

impl SkillComponent for SimpleImage {
    const NAME: &'static str = "simpleImage";
}

/// A card that can sit inside a [`Carousel`].
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselCard {
    Text(TextCard),
    Basic(BasicCard),
    Commerce(CommerceCard),
    List(ListCard),
    Item(ItemCard),
}

impl CarouselCard {
    pub fn name(&self) -> &'static str {
        match self {
            CarouselCard::Text(_) => TextCard::NAME,
            CarouselCard::Basic(_) => BasicCard::NAME,
            CarouselCard::Commerce(_) => CommerceCard::NAME,
            CarouselCard::List(_) => ListCard::NAME,
            CarouselCard::Item(_) => ItemCard::NAME,
        }
    }

    fn inner(&self) -> &dyn Renderable {
        match self {
            CarouselCard::Text(card) => card,
            CarouselCard::Basic(card) => card,
            CarouselCard::Commerce(card) => card,
            CarouselCard::List(card) => card,
            CarouselCard::Item(card) => card,
        }
    }
}

impl Renderable for CarouselCard {
    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }

    fn to_wire(&self) -> Value {
        self.inner().to_wire()
    }
}

macro_rules! carousel_card_from {
    ($($card:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$card> for CarouselCard {
                fn from(card: $card) -> Self {
                    CarouselCard::$variant(card)
                }
            }
        )+
    };
}

carousel_card_from!(
    TextCard => Text,
    BasicCard => Basic,
    CommerceCard => Commerce,
    ListCard => List,
    ItemCard => Item,
);

/// Horizontally scrolling cards of a single variant.
///
/// ```
/// use kskill_core::{Carousel, Renderable, TextCard};
/// use serde_json::json;
///
/// let mut carousel = Carousel::new();
/// carousel.add_item(TextCard::new().title("one")).unwrap();
/// carousel.add_item(TextCard::new().title("two")).unwrap();
/// assert_eq!(
///     carousel.render().unwrap(),
///     json!({"type": "textCard", "items": [{"title": "one"}, {"title": "two"}]})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carousel {
    pub items: Vec<CarouselCard>,
}

impl Carousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Card variant of the carousel, fixed by its first item.
    pub fn card_type(&self) -> Option<&'static str> {
        self.items.first().map(CarouselCard::name)
    }

    /// Appends a card; fails when its variant differs from the cards already present.
    pub fn add_item(&mut self, card: impl Into<CarouselCard>) -> Result<&mut Self> {
        let card = card.into();
        if let Some(expected) = self.card_type()
            && expected != card.name()
        {
            return Err(SkillError::structural(format!(
                "carousel of {expected} cannot take a {}",
                card.name()
            )));
        }
        self.items.push(card);
        Ok(self)
    }

    pub fn remove_item(&mut self, card: &CarouselCard) -> Result<CarouselCard> {
        let index = self
            .items
            .iter()
            .position(|candidate| candidate == card)
            .ok_or_else(|| SkillError::NotFound("card is not part of this carousel".into()))?;
        Ok(self.items.remove(index))
    }
}

impl Renderable for Carousel {
    fn validate(&self) -> Result<()> {
        let Some(expected) = self.card_type() else {
            return Err(SkillError::structural("carousel needs at least one card"));
        };
        if let Some(stray) = self.items.iter().find(|card| card.name() != expected) {
            return Err(SkillError::structural(format!(
                "carousel mixes {expected} with {}",
                stray.name()
            )));
        }
        self.items.iter().try_for_each(Renderable::validate)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .optional("type", self.card_type())
            .list("items", &self.items)
            .build()
    }
}

impl SkillComponent for Carousel {
    const NAME: &'static str = "carousel";
}
