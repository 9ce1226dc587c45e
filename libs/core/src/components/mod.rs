//! Response outputs and the leaf objects they are assembled from.

pub mod card;
pub mod common;
pub mod itemcard;
pub mod simple;

use crate::render::Renderable;

pub use card::{
    BasicCard, ButtonCard, ButtonLayout, CommerceCard, ItemCard, ItemListAlignment, ListCard,
    TextCard,
};
pub use common::{Button, Link, ListItem, ListItemFields, Profile, Thumbnail};
pub use itemcard::{ImageTitle, Item, ItemListSummary, ItemProfile, ItemThumbnail};
pub use simple::{Carousel, CarouselCard, SimpleImage, SimpleText};

/// A renderable output that sits in `template.outputs` under its wire name.
pub trait SkillComponent: Renderable {
    const NAME: &'static str;
}
