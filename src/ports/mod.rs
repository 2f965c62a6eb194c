//! Ports: the trait seams between the transaction lifecycle and its
//! collaborators (persistence, topup provider, payment gateway). Services
//! depend on these traits only, so tests can swap in doubles.

use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::{Category, FulfillmentStatus, PaymentStatus, Product, Transaction};
use crate::gateway::{GatewayError, PaymentSession, SessionRequest};
use crate::provider::{PriceListEntry, ProviderError, TopupReceipt};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".into()),
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Fulfillment evidence written once the provider call reaches an outcome.
#[derive(Debug, Clone)]
pub struct FulfillmentRecord {
    pub status: FulfillmentStatus,
    pub sn: Option<String>,
    pub message: String,
    pub amount_cost: Option<i64>,
    pub provider_ref_id: Option<String>,
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<()>;

    async fn find_by_ref_id(&self, ref_id: &str) -> RepositoryResult<Option<Transaction>>;

    /// Overwrites the payment axis. Replays are allowed here; the gateway is
    /// the source of truth for payment state.
    async fn update_payment(
        &self,
        ref_id: &str,
        payment_status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> RepositoryResult<()>;

    /// Atomic conditional claim: moves `status` from `pending` to
    /// `processing` and reports whether this caller won the claim. Must be a
    /// single conditional write in the store, not an in-process lock, since
    /// webhook handlers may run on independent processes.
    async fn claim_for_fulfillment(&self, ref_id: &str) -> RepositoryResult<bool>;

    async fn record_fulfillment(
        &self,
        ref_id: &str,
        record: &FulfillmentRecord,
    ) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_product(&self, sku_code: &str) -> RepositoryResult<Option<Product>>;

    async fn find_product_with_category(
        &self,
        sku_code: &str,
    ) -> RepositoryResult<Option<(Product, Category)>>;

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;

    async fn upsert_product(
        &self,
        category_id: uuid::Uuid,
        sku_code: &str,
        product_name: &str,
        price_cost: i64,
        price_sell: i64,
        active: bool,
    ) -> RepositoryResult<()>;
}

/// The topup provider's transaction primitive, shared by fulfillment (live)
/// and the nickname probe (dry-run with a throwaway ref id).
#[async_trait]
pub trait TopupProvider: Send + Sync {
    async fn create_transaction(
        &self,
        sku_code: &str,
        customer_no: &str,
        ref_id: &str,
    ) -> Result<TopupReceipt, ProviderError>;

    async fn price_list(&self) -> Result<Vec<PriceListEntry>, ProviderError>;

    async fn balance(&self) -> Result<BigDecimal, ProviderError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: &SessionRequest)
        -> Result<PaymentSession, GatewayError>;
}

pub type DynTransactionRepository = Arc<dyn TransactionRepository>;
pub type DynCatalogRepository = Arc<dyn CatalogRepository>;
pub type DynTopupProvider = Arc<dyn TopupProvider>;
pub type DynPaymentGateway = Arc<dyn PaymentGateway>;
