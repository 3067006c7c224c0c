use serde::{Deserialize, Serialize};

use crate::{models::course::Course, utils::money::round_cents};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub course_id: i64,
    pub product_id: Option<i64>,
    pub course_name: String,
    pub price: f64,
    pub slug: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Line item for one seat in `course`. An explicit product id wins over
    /// the one recorded on the course.
    pub fn from_course(course: &Course, product_id: Option<i64>) -> Self {
        Self {
            course_id: course.id,
            product_id: product_id.or(course.product_id),
            course_name: course.title.clone(),
            price: course.price,
            slug: course.slug.clone(),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Shopping cart. `total` and `item_count` are derived from `items` and are
/// recomputed whenever a cart is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub item_count: u32,
}

impl Cart {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = round_cents(items.iter().map(CartItem::line_total).sum());
        let item_count = items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity));
        Self {
            items,
            total,
            item_count,
        }
    }

    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, course_id: i64) -> bool {
        self.items.iter().any(|item| item.course_id == course_id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

/// Body of `POST /api/cart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartActionRequest {
    pub action: Option<String>,
    pub course_id: Option<i64>,
    pub product_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Remove,
    Clear,
}

impl std::str::FromStr for CartAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(CartAction::Add),
            "remove" => Ok(CartAction::Remove),
            "clear" => Ok(CartAction::Clear),
            other => Err(format!("Unknown cart action: {}", other)),
        }
    }
}
