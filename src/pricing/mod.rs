//! Pure pricing rules: payment-method surcharge and category markup.
//!
//! All rounding is ceiling. Fractional units are never absorbed by the
//! platform, so a computed fee or sell price is only ever rounded up.

use bigdecimal::{BigDecimal, ToPrimitive};

/// Flat surcharge for virtual-account style payment methods.
const VA_FLAT_FEE: i64 = 4000;

/// Default markup applied when a category carries no explicit rule.
/// Must stay positive so the platform never sells at cost.
pub const DEFAULT_FLAT_MARKUP: i64 = 1500;

/// Surcharge added on top of the base sell price for a payment method.
///
/// Method matching is case-insensitive; bank/virtual-account families are
/// matched by substring. `small_screen` is the device class of the client,
/// which only matters for gopay.
pub fn payment_fee(base_price: i64, payment_method: &str, small_screen: bool) -> i64 {
    let method = payment_method.to_ascii_lowercase();

    if method == "gopay" {
        if small_screen {
            div_ceil(base_price * 2, 100)
        } else {
            0
        }
    } else if method == "dana" {
        // 1.5% == 3/200
        div_ceil(base_price * 3, 200)
    } else if method == "qris" {
        0
    } else if method.contains("va") || method.contains("bank") || method.contains("echannel") {
        VA_FLAT_FEE
    } else {
        0
    }
}

/// Ceiling division for non-negative operands.
fn div_ceil(numerator: i64, divisor: i64) -> i64 {
    (numerator + divisor - 1) / divisor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupType {
    Flat,
    Percent,
    Hybrid,
}

impl MarkupType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "flat" => Some(MarkupType::Flat),
            "percent" => Some(MarkupType::Percent),
            "hybrid" => Some(MarkupType::Hybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkupType::Flat => "flat",
            MarkupType::Percent => "percent",
            MarkupType::Hybrid => "hybrid",
        }
    }
}

/// Per-category policy converting provider cost into a sell price.
#[derive(Debug, Clone)]
pub struct MarkupRule {
    pub markup_type: MarkupType,
    pub percent: BigDecimal,
    pub flat: BigDecimal,
}

impl Default for MarkupRule {
    fn default() -> Self {
        Self {
            markup_type: MarkupType::Flat,
            percent: BigDecimal::from(0),
            flat: BigDecimal::from(DEFAULT_FLAT_MARKUP),
        }
    }
}

/// Customer-facing sell price for a given provider cost, rounded up to the
/// nearest whole currency unit.
///
/// `hybrid` takes the higher of the percent and flat results, so the rule
/// never yields a lower margin than either component alone.
pub fn sell_price(cost: &BigDecimal, rule: &MarkupRule) -> i64 {
    let by_percent = || cost * (BigDecimal::from(1) + &rule.percent);
    let by_flat = || cost + &rule.flat;

    let raw = match rule.markup_type {
        MarkupType::Flat => by_flat(),
        MarkupType::Percent => by_percent(),
        MarkupType::Hybrid => {
            let percent = by_percent();
            let flat = by_flat();
            if percent > flat { percent } else { flat }
        }
    };

    ceil_to_unit(&raw)
}

/// Rounds a non-negative decimal up to the nearest whole unit.
fn ceil_to_unit(value: &BigDecimal) -> i64 {
    let truncated = value.with_scale(0).to_i64().unwrap_or(0);
    if &BigDecimal::from(truncated) < value {
        truncated + 1
    } else {
        truncated
    }
}
