//! Customer-facing status view: read-only composition of a transaction with
//! its product and category.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{FulfillmentStatus, PaymentStatus};
use crate::error::AppError;
use crate::ports::{DynCatalogRepository, DynTransactionRepository};
use crate::pricing;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionStatusView {
    pub invoice: String,
    pub customer_no: String,
    pub server_id: Option<String>,
    pub product_name: String,
    pub category_name: Option<String>,
    pub payment_method: String,
    pub price: i64,
    pub fee: i64,
    pub total: i64,
    pub status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    pub sn: Option<String>,
    pub message: Option<String>,
    pub snap_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct StatusService {
    transactions: DynTransactionRepository,
    catalog: DynCatalogRepository,
}

impl StatusService {
    pub fn new(transactions: DynTransactionRepository, catalog: DynCatalogRepository) -> Self {
        Self {
            transactions,
            catalog,
        }
    }

    pub async fn status_view(&self, ref_id: &str) -> Result<TransactionStatusView, AppError> {
        let tx = self
            .transactions
            .find_by_ref_id(ref_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {ref_id}")))?;

        // The product may have been resynced away since checkout; the sku
        // code is still a usable display name.
        let (product_name, category_name) = match self
            .catalog
            .find_product_with_category(&tx.sku_code)
            .await?
        {
            Some((product, category)) => (product.product_name, Some(category.name)),
            None => (tx.sku_code.clone(), None),
        };

        // Fee is never re-charged; it is recomputed only for display. The
        // device class at checkout is not stored, so it is inferred from
        // whether a fee was charged at all.
        let fee = pricing::payment_fee(tx.amount_sell, &tx.payment_method, tx.fee > 0);

        Ok(TransactionStatusView {
            invoice: tx.ref_id,
            customer_no: tx.customer_no,
            server_id: tx.server_id,
            product_name,
            category_name,
            payment_method: tx.payment_method,
            price: tx.amount_sell,
            fee,
            total: tx.amount_sell + fee,
            status: tx.status,
            payment_status: tx.payment_status,
            sn: tx.sn,
            message: tx.message,
            snap_token: tx.snap_token,
            created_at: tx.created_at,
        })
    }
}
