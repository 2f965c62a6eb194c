//! Catalog price sync: pulls the provider price list and recomputes sell
//! prices through each category's markup rule.
//!
//! Brands without an existing category are skipped; bootstrapping new
//! categories is an admin concern outside this engine.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::error::AppError;
use crate::ports::{DynCatalogRepository, DynTopupProvider};
use crate::pricing;

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SyncReport {
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Clone)]
pub struct CatalogSyncService {
    catalog: DynCatalogRepository,
    provider: DynTopupProvider,
}

impl CatalogSyncService {
    pub fn new(catalog: DynCatalogRepository, provider: DynTopupProvider) -> Self {
        Self { catalog, provider }
    }

    pub async fn sync_products(&self) -> Result<SyncReport, AppError> {
        // A rate-limited price list (rc=83) surfaces as RateLimited here,
        // distinct from a generic provider failure.
        let entries = self.provider.price_list().await?;

        let categories = self.catalog.list_categories().await?;
        let by_brand: HashMap<&str, _> = categories
            .iter()
            .map(|category| (category.name.as_str(), category))
            .collect();

        let mut report = SyncReport::default();

        for entry in entries {
            let Some(category) = by_brand.get(entry.brand.as_str()) else {
                report.skipped += 1;
                continue;
            };

            let rule = category.markup_rule();
            let price_sell = pricing::sell_price(&BigDecimal::from(entry.price), &rule);
            let active = entry.buyer_product_status && entry.seller_product_status;

            match self
                .catalog
                .upsert_product(
                    category.id,
                    &entry.buyer_sku_code,
                    &entry.product_name,
                    entry.price,
                    price_sell,
                    active,
                )
                .await
            {
                Ok(()) => report.updated += 1,
                Err(err) => {
                    tracing::warn!(sku_code = %entry.buyer_sku_code, error = %err, "product sync failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "catalog sync finished"
        );

        Ok(report)
    }
}
