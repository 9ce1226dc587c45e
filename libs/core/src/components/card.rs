//! Card outputs. Every card owns an ordered button list managed through [`ButtonCard`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::SkillComponent;
use crate::components::common::{Button, ListItem, ListItemFields, Profile, Thumbnail};
use crate::components::itemcard::{ImageTitle, Item, ItemListSummary, ItemProfile, ItemThumbnail};
use crate::config::SkillLimits;
use crate::error::{Result, SkillError};
use crate::interaction::ActionFields;
use crate::render::{Renderable, WireObject};

/// Button management shared by every card variant.
pub trait ButtonCard {
    fn buttons(&self) -> &[Button];

    fn buttons_mut(&mut self) -> &mut Vec<Button>;

    fn add_button(&mut self, button: Button) -> &mut Self {
        self.buttons_mut().push(button);
        self
    }

    /// Builds a [`Button`] from raw arguments and appends it.
    fn add_button_fields(
        &mut self,
        label: &str,
        action: &str,
        fields: ActionFields,
    ) -> Result<&mut Self> {
        let button = Button::from_fields(label, action, fields)?;
        Ok(self.add_button(button))
    }

    fn remove_button(&mut self, button: &Button) -> Result<Button> {
        remove_member(self.buttons_mut(), button, "button")
    }
}

fn remove_member<T>(list: &mut Vec<T>, target: &T, what: &str) -> Result<T>
where
    T: PartialEq,
{
    let index = list
        .iter()
        .position(|candidate| candidate == target)
        .ok_or_else(|| SkillError::NotFound(format!("{what} is not part of this card")))?;
    Ok(list.remove(index))
}

fn remove_index<T>(list: &mut Vec<T>, index: usize, what: &str) -> Result<T> {
    if index >= list.len() {
        return Err(SkillError::NotFound(format!(
            "{what} index {index} is out of range (len {})",
            list.len()
        )));
    }
    Ok(list.remove(index))
}

fn validate_all<R: Renderable>(items: &[R]) -> Result<()> {
    items.iter().try_for_each(Renderable::validate)
}

macro_rules! button_card {
    ($($card:ty),+ $(,)?) => {
        $(
            impl ButtonCard for $card {
                fn buttons(&self) -> &[Button] {
                    &self.buttons
                }

                fn buttons_mut(&mut self) -> &mut Vec<Button> {
                    &mut self.buttons
                }
            }
        )+
    };
}

button_card!(TextCard, BasicCard, CommerceCard, ListCard, ItemCard);

/// Text-only card. Needs a title or a description.
///
/// ```
/// use kskill_core::{Renderable, TextCard};
/// use serde_json::json;
///
/// let card = TextCard::new().description("Opening hours: 9 to 6");
/// assert_eq!(card.render().unwrap(), json!({"description": "Opening hours: 9 to 6"}));
/// assert!(TextCard::new().render().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub buttons: Vec<Button>,
}

impl TextCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Renderable for TextCard {
    fn validate(&self) -> Result<()> {
        if self.title.is_none() && self.description.is_none() {
            return Err(SkillError::structural(
                "textCard needs a title or a description",
            ));
        }
        validate_all(&self.buttons)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .optional("title", self.title.as_deref())
            .optional("description", self.description.as_deref())
            .list("buttons", &self.buttons)
            .build()
    }
}

impl SkillComponent for TextCard {
    const NAME: &'static str = "textCard";
}

/// Image card with optional text and buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicCard {
    pub thumbnail: Thumbnail,
    pub title: Option<String>,
    pub description: Option<String>,
    pub buttons: Vec<Button>,
    pub forwardable: bool,
}

impl BasicCard {
    pub fn new(thumbnail: Thumbnail) -> Self {
        Self {
            thumbnail,
            title: None,
            description: None,
            buttons: Vec::new(),
            forwardable: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn forwardable(mut self, forwardable: bool) -> Self {
        self.forwardable = forwardable;
        self
    }
}

impl Renderable for BasicCard {
    fn validate(&self) -> Result<()> {
        self.thumbnail.validate()?;
        validate_all(&self.buttons)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .nested("thumbnail", Some(&self.thumbnail))
            .optional("title", self.title.as_deref())
            .optional("description", self.description.as_deref())
            .list("buttons", &self.buttons)
            .flag("forwardable", self.forwardable)
            .build()
    }
}

impl SkillComponent for BasicCard {
    const NAME: &'static str = "basicCard";
}

/// Product card. Discount fields are independent and emitted as given.
#[derive(Debug, Clone, PartialEq)]
pub struct CommerceCard {
    pub price: u64,
    pub thumbnails: Vec<Thumbnail>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
    pub discount: Option<u64>,
    pub discount_rate: Option<u64>,
    pub discount_price: Option<u64>,
    pub profile: Option<Profile>,
    pub buttons: Vec<Button>,
}

impl CommerceCard {
    pub const CURRENCY: &'static str = "won";

    pub fn new(price: u64) -> Self {
        Self {
            price,
            thumbnails: Vec::new(),
            title: None,
            description: None,
            currency: None,
            discount: None,
            discount_rate: None,
            discount_price: None,
            profile: None,
            buttons: Vec::new(),
        }
    }

    pub fn thumbnail(mut self, thumbnail: Thumbnail) -> Self {
        self.thumbnails.push(thumbnail);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn discount(mut self, discount: u64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn discount_rate(mut self, discount_rate: u64) -> Self {
        self.discount_rate = Some(discount_rate);
        self
    }

    pub fn discount_price(mut self, discount_price: u64) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }
}

impl Renderable for CommerceCard {
    fn validate(&self) -> Result<()> {
        if self.thumbnails.is_empty() {
            return Err(SkillError::structural(
                "commerceCard needs at least one thumbnail",
            ));
        }
        if let Some(currency) = self.currency.as_deref()
            && currency != Self::CURRENCY
        {
            return Err(SkillError::structural(format!(
                "unsupported currency `{currency}`, only `{}` is accepted",
                Self::CURRENCY
            )));
        }
        validate_all(&self.thumbnails)?;
        if let Some(profile) = &self.profile {
            profile.validate()?;
        }
        validate_all(&self.buttons)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("price", self.price)
            .list("thumbnails", &self.thumbnails)
            .optional("title", self.title.as_deref())
            .optional("description", self.description.as_deref())
            .optional("currency", self.currency.as_deref())
            .optional("discount", self.discount)
            .optional("discountRate", self.discount_rate)
            .optional("discountPrice", self.discount_price)
            .nested("profile", self.profile.as_ref())
            .list("buttons", &self.buttons)
            .build()
    }
}

impl SkillComponent for CommerceCard {
    const NAME: &'static str = "commerceCard";
}

impl From<&str> for ListItem {
    fn from(title: &str) -> Self {
        ListItem::new(title)
    }
}

impl From<String> for ListItem {
    fn from(title: String) -> Self {
        ListItem::new(title)
    }
}

/// Header plus a capped list of rows.
///
/// A text header is wrapped into a [`ListItem`]. The item cap is 5 for a standalone card and
/// 4 inside a carousel, see [`ListCard::for_carousel`].
///
/// ```
/// use kskill_core::{ListCard, ListItem, Renderable};
///
/// let mut card = ListCard::new("Menu");
/// for n in 1..=5 {
///     card.add_item(ListItem::new(format!("Item {n}")));
/// }
/// assert!(card.render().is_ok());
/// card.add_item(ListItem::new("Item 6"));
/// assert!(card.render().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ListCard {
    pub header: ListItem,
    pub items: Vec<ListItem>,
    pub buttons: Vec<Button>,
    pub max_items: usize,
    pub max_buttons: usize,
}

impl ListCard {
    pub fn new(header: impl Into<ListItem>) -> Self {
        Self::with_limits(header, &SkillLimits::default())
    }

    pub fn with_limits(header: impl Into<ListItem>, limits: &SkillLimits) -> Self {
        Self {
            header: header.into(),
            items: Vec::new(),
            buttons: Vec::new(),
            max_items: limits.list_card_max_items,
            max_buttons: limits.list_card_max_buttons,
        }
    }

    pub fn for_carousel(header: impl Into<ListItem>) -> Self {
        let limits = SkillLimits::default();
        Self::with_limits(header, &limits).max_items(limits.carousel_list_card_max_items)
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn max_buttons(mut self, max_buttons: usize) -> Self {
        self.max_buttons = max_buttons;
        self
    }

    pub fn add_item(&mut self, item: ListItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_item_fields(&mut self, title: &str, fields: ListItemFields) -> Result<&mut Self> {
        let item = ListItem::from_fields(title, fields)?;
        Ok(self.add_item(item))
    }

    pub fn remove_item(&mut self, item: &ListItem) -> Result<ListItem> {
        remove_member(&mut self.items, item, "list item")
    }

    pub fn remove_item_at(&mut self, index: usize) -> Result<ListItem> {
        remove_index(&mut self.items, index, "list item")
    }
}

impl Renderable for ListCard {
    fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(SkillError::structural("listCard needs at least one item"));
        }
        if self.items.len() > self.max_items {
            return Err(SkillError::structural(format!(
                "listCard holds at most {} items, got {}",
                self.max_items,
                self.items.len()
            )));
        }
        if self.buttons.len() > self.max_buttons {
            return Err(SkillError::structural(format!(
                "listCard holds at most {} buttons, got {}",
                self.max_buttons,
                self.buttons.len()
            )));
        }
        self.header.validate()?;
        validate_all(&self.items)?;
        validate_all(&self.buttons)
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .nested("header", Some(&self.header))
            .list("items", &self.items)
            .list("buttons", &self.buttons)
            .build()
    }
}

impl SkillComponent for ListCard {
    const NAME: &'static str = "listCard";
}

macro_rules! wire_token {
    ($name:ident, $what:literal, { $($variant:ident => $token:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SkillError;

            fn from_str(token: &str) -> Result<Self> {
                match token.trim().to_ascii_lowercase().as_str() {
                    $($token => Ok($name::$variant),)+
                    other => Err(SkillError::structural(format!(
                        concat!("unknown ", $what, " `{}`"),
                        other
                    ))),
                }
            }
        }
    };
}

wire_token!(ItemListAlignment, "item list alignment", { Left => "left", Right => "right" });
wire_token!(ButtonLayout, "button layout", { Vertical => "vertical", Horizontal => "horizontal" });

/// Receipt-style card built from `title: description` rows.
///
/// `head` and `profile` are meant to be used one at a time; both are accepted and rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCard {
    pub item_list: Vec<Item>,
    pub thumbnail: Option<ItemThumbnail>,
    pub head: Option<String>,
    pub profile: Option<ItemProfile>,
    pub image_title: Option<ImageTitle>,
    pub item_list_alignment: Option<ItemListAlignment>,
    pub item_list_summary: Option<ItemListSummary>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub buttons: Vec<Button>,
    pub button_layout: Option<ButtonLayout>,
}

impl ItemCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thumbnail(mut self, thumbnail: ItemThumbnail) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn profile(mut self, profile: ItemProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn image_title(mut self, image_title: ImageTitle) -> Self {
        self.image_title = Some(image_title);
        self
    }

    pub fn item_list_alignment(mut self, alignment: ItemListAlignment) -> Self {
        self.item_list_alignment = Some(alignment);
        self
    }

    pub fn item_list_summary(mut self, summary: ItemListSummary) -> Self {
        self.item_list_summary = Some(summary);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn button_layout(mut self, layout: ButtonLayout) -> Self {
        self.button_layout = Some(layout);
        self
    }

    pub fn add_item(&mut self, item: Item) -> &mut Self {
        self.item_list.push(item);
        self
    }

    pub fn add_item_fields(&mut self, title: &str, description: &str) -> &mut Self {
        self.add_item(Item::new(title, description))
    }

    pub fn remove_item(&mut self, item: &Item) -> Result<Item> {
        remove_member(&mut self.item_list, item, "item")
    }

    pub fn remove_item_at(&mut self, index: usize) -> Result<Item> {
        remove_index(&mut self.item_list, index, "item")
    }

    /// Removes the first row whose title and description both match.
    pub fn remove_item_fields(&mut self, title: &str, description: &str) -> Result<Item> {
        self.remove_item(&Item::new(title, description))
    }
}

impl Renderable for ItemCard {
    fn validate(&self) -> Result<()> {
        if self.item_list.is_empty() {
            return Err(SkillError::structural("itemCard needs at least one item"));
        }
        validate_all(&self.item_list)?;
        if let Some(thumbnail) = &self.thumbnail {
            thumbnail.validate()?;
        }
        if let Some(profile) = &self.profile {
            profile.validate()?;
        }
        if let Some(image_title) = &self.image_title {
            image_title.validate()?;
        }
        if let Some(summary) = &self.item_list_summary {
            summary.validate()?;
        }
        validate_all(&self.buttons)
    }

    fn to_wire(&self) -> Value {
        let head = self
            .head
            .as_deref()
            .filter(|head| !head.trim().is_empty())
            .map(|head| WireObject::new().field("title", head).build());
        WireObject::new()
            .nested("thumbnail", self.thumbnail.as_ref())
            .optional("head", head)
            .nested("profile", self.profile.as_ref())
            .nested("imageTitle", self.image_title.as_ref())
            .list("itemList", &self.item_list)
            .optional("itemListAlignment", self.item_list_alignment.map(|a| a.as_str()))
            .nested("itemListSummary", self.item_list_summary.as_ref())
            .optional("title", self.title.as_deref())
            .optional("description", self.description.as_deref())
            .optional("buttonLayout", self.button_layout.map(|l| l.as_str()))
            .list("buttons", &self.buttons)
            .build()
    }
}

impl SkillComponent for ItemCard {
    const NAME: &'static str = "itemCard";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::common::Link;
    use crate::interaction::Action;
    use serde_json::json;

    fn thumbnail() -> Thumbnail {
        Thumbnail::new("https://example.com/image.jpg")
    }

    #[test]
    fn text_card_renders_whichever_text_is_set() {
        assert_eq!(
            TextCard::new().title("Title").render().unwrap(),
            json!({"title": "Title"})
        );
        assert_eq!(
            TextCard::new().render().unwrap_err().kind(),
            "structural_violation"
        );
    }

    #[test]
    fn add_button_fields_matches_prebuilt_button() {
        let mut built = TextCard::new().title("t");
        built.add_button(Button::new("Go", Action::Block).block_id("b1"));
        let mut raw = TextCard::new().title("t");
        raw.add_button_fields("Go", "block", ActionFields::new().block_id("b1"))
            .unwrap();
        assert_eq!(built.render().unwrap(), raw.render().unwrap());
    }

    #[test]
    fn remove_button_reports_missing_buttons() {
        let button = Button::new("Share", Action::Share);
        let mut card = BasicCard::new(thumbnail());
        card.add_button(button.clone());
        assert_eq!(card.remove_button(&button).unwrap(), button);
        assert!(matches!(
            card.remove_button(&button),
            Err(SkillError::NotFound(_))
        ));
    }

    #[test]
    fn invalid_button_fails_the_card() {
        let mut card = BasicCard::new(thumbnail());
        card.add_button(Button::new("Call", Action::Phone));
        assert_eq!(card.render().unwrap_err(), card.validate().unwrap_err());
    }

    #[test]
    fn basic_card_emits_forwardable_only_when_set() {
        let card = BasicCard::new(thumbnail()).title("t");
        assert!(card.render().unwrap().get("forwardable").is_none());
        let card = card.forwardable(true);
        assert_eq!(card.render().unwrap()["forwardable"], json!(true));
    }

    #[test]
    fn commerce_card_keeps_discount_fields_independent() {
        let card = CommerceCard::new(10_000)
            .thumbnail(thumbnail())
            .discount_price(9000);
        assert_eq!(
            card.render().unwrap(),
            json!({
                "price": 10000,
                "thumbnails": [{"imageUrl": "https://example.com/image.jpg"}],
                "discountPrice": 9000
            })
        );
    }

    #[test]
    fn commerce_card_rules() {
        assert!(matches!(
            CommerceCard::new(1).render(),
            Err(SkillError::StructuralViolation(_))
        ));
        let dollars = CommerceCard::new(1).thumbnail(thumbnail()).currency("usd");
        assert!(matches!(
            dollars.render(),
            Err(SkillError::StructuralViolation(_))
        ));
        let won = CommerceCard::new(1)
            .thumbnail(thumbnail())
            .currency("won")
            .profile(Profile::new("Shop"));
        assert_eq!(won.render().unwrap()["currency"], json!("won"));
    }

    #[test]
    fn list_card_wraps_text_header() {
        let mut card = ListCard::new("Header");
        card.add_item(ListItem::new("one"));
        assert_eq!(
            card.render().unwrap(),
            json!({"header": {"title": "Header"}, "items": [{"title": "one"}]})
        );
    }

    #[test]
    fn list_card_enforces_caps() {
        let mut card = ListCard::new("h");
        assert!(card.validate().is_err());
        for n in 0..5 {
            card.add_item(ListItem::new(format!("item {n}")));
        }
        assert!(card.validate().is_ok());
        card.add_item(ListItem::new("sixth"));
        assert!(matches!(
            card.validate(),
            Err(SkillError::StructuralViolation(_))
        ));

        let mut carousel_card = ListCard::for_carousel("h");
        for n in 0..5 {
            carousel_card.add_item(ListItem::new(format!("item {n}")));
        }
        assert!(carousel_card.validate().is_err());
        carousel_card.remove_item_at(4).unwrap();
        assert!(carousel_card.validate().is_ok());

        let mut buttons = ListCard::new("h");
        buttons.add_item(ListItem::new("one"));
        for _ in 0..3 {
            buttons.add_button(Button::new("Share", Action::Share));
        }
        assert!(buttons.validate().is_err());
    }

    #[test]
    fn list_card_raw_and_prebuilt_items_render_the_same() {
        let mut built = ListCard::new("h");
        built.add_item(
            ListItem::new("Row")
                .description("d")
                .image_url("https://example.com/r.png")
                .link(Link::web("https://example.com"))
                .action(Action::Message)
                .message_text("row"),
        );
        let mut raw = ListCard::new("h");
        raw.add_item_fields(
            "Row",
            ListItemFields {
                description: Some("d".into()),
                image_url: Some("https://example.com/r.png".into()),
                link: Some(Link::web("https://example.com")),
                action: Some("message".into()),
                message_text: Some("row".into()),
                ..ListItemFields::default()
            },
        )
        .unwrap();
        assert_eq!(built.render().unwrap(), raw.render().unwrap());
    }

    #[test]
    fn list_card_removal() {
        let mut card = ListCard::new("h");
        card.add_item(ListItem::new("a")).add_item(ListItem::new("b"));
        assert_eq!(card.remove_item(&ListItem::new("a")).unwrap().title, "a");
        assert!(matches!(
            card.remove_item(&ListItem::new("a")),
            Err(SkillError::NotFound(_))
        ));
        assert!(matches!(
            card.remove_item_at(3),
            Err(SkillError::NotFound(_))
        ));
    }

    #[test]
    fn item_card_renders_head_as_object() {
        let mut card = ItemCard::new()
            .head("Receipt")
            .item_list_alignment(ItemListAlignment::Right)
            .button_layout(ButtonLayout::Vertical);
        card.add_item_fields("Coffee", "4,500");
        assert_eq!(
            card.render().unwrap(),
            json!({
                "head": {"title": "Receipt"},
                "itemList": [{"title": "Coffee", "description": "4,500"}],
                "itemListAlignment": "right",
                "buttonLayout": "vertical"
            })
        );
    }

    #[test]
    fn item_card_omits_blank_head() {
        let mut card = ItemCard::new().head("  ");
        card.add_item_fields("Coffee", "4,500");
        assert_eq!(
            card.render().unwrap(),
            json!({"itemList": [{"title": "Coffee", "description": "4,500"}]})
        );
    }

    #[test]
    fn item_card_accepts_head_and_profile_together() {
        let mut card = ItemCard::new()
            .head("Receipt")
            .profile(ItemProfile::new("Store"));
        card.add_item(Item::new("a", "1"));
        let rendered = card.render().unwrap();
        assert_eq!(rendered["head"], json!({"title": "Receipt"}));
        assert_eq!(rendered["profile"], json!({"title": "Store"}));
    }

    #[test]
    fn item_card_removal_modes() {
        let mut card = ItemCard::new();
        card.add_item_fields("a", "1")
            .add_item_fields("b", "2")
            .add_item_fields("c", "3");
        assert_eq!(card.remove_item(&Item::new("a", "1")).unwrap().title, "a");
        assert_eq!(card.remove_item_at(0).unwrap().title, "b");
        assert_eq!(card.remove_item_fields("c", "3").unwrap().title, "c");
        assert!(card.validate().is_err());
        assert!(matches!(
            card.remove_item_fields("c", "3"),
            Err(SkillError::NotFound(_))
        ));
    }

    #[test]
    fn layout_tokens_parse_case_insensitively() {
        assert_eq!("LEFT".parse::<ItemListAlignment>().unwrap(), ItemListAlignment::Left);
        assert_eq!("Horizontal".parse::<ButtonLayout>().unwrap(), ButtonLayout::Horizontal);
        assert!("diagonal".parse::<ButtonLayout>().is_err());
    }
}
