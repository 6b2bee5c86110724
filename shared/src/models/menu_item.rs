//! Menu Item Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::RestaurantSummary;

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create menu item payload
///
/// Price range and precision are checked separately since `Decimal`
/// has no derive support.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Update menu item payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

impl MenuItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.is_available.is_none()
    }
}

/// Customer-facing menu of one restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenu {
    pub restaurant: RestaurantSummary,
    pub items: Vec<MenuItem>,
    pub categories: Vec<String>,
    pub total_items: usize,
}

/// Items of one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategoryGroup {
    pub category: String,
    pub items: Vec<MenuItem>,
    pub item_count: usize,
}
