use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub value: f64,
    /// Smallest subtotal the code applies to.
    pub min_amount: Option<f64>,
    /// Cap on the discount amount.
    pub max_amount: Option<f64>,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub description: String,
}

fn default_active() -> bool {
    true
}

impl Discount {
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.used_count >= limit)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResult {
    pub code: String,
    pub discount_amount: f64,
    pub final_total: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDiscountRequest {
    pub code: Option<String>,
    /// Falls back to the cart total when absent.
    pub subtotal: Option<f64>,
}
