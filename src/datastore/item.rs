use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ItemId = i64;

pub const MAX_NAME_LEN: usize = 99;
pub const MAX_CATEGORY_LEN: usize = 49;
pub const MAX_DESCRIPTION_LEN: usize = 499;
pub const MAX_DATE_LEN: usize = 19;
pub const MAX_LOCATION_LEN: usize = 199;
pub const MAX_COLOR_LEN: usize = 49;
pub const MAX_CONTACT_LEN: usize = 99;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("lost") {
            Ok(ItemType::Lost)
        } else if s.eq_ignore_ascii_case("found") {
            Ok(ItemType::Found)
        } else {
            Err(CatalogError::UnknownItemType(s.to_string()))
        }
    }
}

/// A lost or found object as reported to the catalog.
///
/// Items are plain values: every container that stores one keeps its own
/// copy, so mutating an item after insertion never reaches the container.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub color: String,
    pub contact: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl Item {
    /// Start building an item. Optional text fields default to empty.
    pub fn builder(id: ItemId, name: impl Into<String>, item_type: ItemType) -> ItemBuilder {
        ItemBuilder {
            item: Item {
                id,
                name: name.into(),
                category: String::new(),
                description: String::new(),
                date: String::new(),
                location: String::new(),
                color: String::new(),
                contact: String::new(),
                item_type,
            },
        }
    }

    /// Checks every text field against its length limit.
    pub fn validate(&self) -> Result<()> {
        check_len("name", &self.name, MAX_NAME_LEN)?;
        check_len("category", &self.category, MAX_CATEGORY_LEN)?;
        check_len("description", &self.description, MAX_DESCRIPTION_LEN)?;
        check_len("date", &self.date, MAX_DATE_LEN)?;
        check_len("location", &self.location, MAX_LOCATION_LEN)?;
        check_len("color", &self.color, MAX_COLOR_LEN)?;
        check_len("contact", &self.contact, MAX_CONTACT_LEN)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID:{}, Type:{})", self.name, self.id, self.item_type)
    }
}

pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.item.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.item.description = description.into();
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.item.date = date.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.item.location = location.into();
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.item.color = color.into();
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.item.contact = contact.into();
        self
    }

    /// Validates field lengths and returns the finished item.
    pub fn build(self) -> Result<Item> {
        self.item.validate()?;
        Ok(self.item)
    }
}

pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let actual = value.chars().count();
    if actual > max {
        return Err(CatalogError::FieldTooLong { field, max, actual });
    }
    Ok(())
}
