//! Catalog read models. The catalog itself is managed by an external
//! collaborator; this core only reads products and category markup rules,
//! plus the price updates written by the sync job.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pricing::{MarkupRule, MarkupType};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub sku_code: String,
    pub product_name: String,
    pub price_cost: i64,
    pub price_sell: i64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub markup_type: String,
    pub markup_percent: BigDecimal,
    pub markup_flat: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Markup rule for this category. Falls back to the default positive
    /// flat markup when the stored type is unknown, so a bad row can never
    /// make the platform sell at cost.
    pub fn markup_rule(&self) -> MarkupRule {
        match MarkupType::parse(&self.markup_type) {
            Some(markup_type) => MarkupRule {
                markup_type,
                percent: self.markup_percent.clone(),
                flat: self.markup_flat.clone(),
            },
            None => MarkupRule::default(),
        }
    }
}
