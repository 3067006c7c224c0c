use crate::{
    models::discount::{Discount, DiscountResult, DiscountType},
    utils::money::round_cents,
};

/// Discount codes on offer. Usage is not tracked yet, so `used_count` is
/// static.
pub fn mock_discounts() -> Vec<Discount> {
    vec![
        Discount {
            code: "WELCOME10".into(),
            kind: DiscountType::Percentage,
            value: 10.0,
            min_amount: Some(30.0),
            max_amount: None,
            usage_limit: None,
            used_count: 0,
            active: true,
            description: "10% off your first course".into(),
        },
        Discount {
            code: "OUTLIER20".into(),
            kind: DiscountType::Fixed,
            value: 20.0,
            min_amount: Some(100.0),
            max_amount: None,
            usage_limit: Some(500),
            used_count: 137,
            active: true,
            description: "$20 off orders over $100".into(),
        },
        Discount {
            code: "STUDENT25".into(),
            kind: DiscountType::Percentage,
            value: 25.0,
            min_amount: None,
            max_amount: Some(50.0),
            usage_limit: None,
            used_count: 0,
            active: true,
            description: "25% student discount, up to $50".into(),
        },
        Discount {
            code: "LAUNCH50".into(),
            kind: DiscountType::Percentage,
            value: 50.0,
            min_amount: None,
            max_amount: None,
            usage_limit: Some(100),
            used_count: 100,
            active: true,
            description: "Launch week promotion".into(),
        },
        Discount {
            code: "BLACKFRIDAY".into(),
            kind: DiscountType::Percentage,
            value: 40.0,
            min_amount: None,
            max_amount: None,
            usage_limit: None,
            used_count: 0,
            active: false,
            description: "Black Friday sale".into(),
        },
    ]
}

/// Case-insensitive lookup of a discount code.
pub fn find_discount(code: &str) -> Option<Discount> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    mock_discounts()
        .into_iter()
        .find(|discount| discount.code.eq_ignore_ascii_case(code))
}

/// Applies `discount` to `subtotal`. Returns `None` when the code cannot be
/// used for this order. The discounted total never goes below zero.
pub fn calculate_discount(subtotal: f64, discount: &Discount) -> Option<DiscountResult> {
    if !discount.active || discount.is_exhausted() || !subtotal.is_finite() || subtotal <= 0.0 {
        return None;
    }
    if let Some(min_amount) = discount.min_amount {
        if subtotal < min_amount {
            return None;
        }
    }

    let mut amount = match discount.kind {
        DiscountType::Percentage => subtotal * discount.value / 100.0,
        DiscountType::Fixed => discount.value,
    };
    if let Some(max_amount) = discount.max_amount {
        amount = amount.min(max_amount);
    }
    let amount = round_cents(amount.clamp(0.0, subtotal));

    Some(DiscountResult {
        code: discount.code.clone(),
        discount_amount: amount,
        final_total: round_cents(subtotal - amount).max(0.0),
    })
}
