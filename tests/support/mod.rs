//! In-memory doubles for the repository, provider and gateway ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use topup_core::domain::{Category, FulfillmentStatus, PaymentStatus, Product, Transaction};
use topup_core::gateway::{GatewayError, PaymentSession, SessionRequest};
use topup_core::ports::{
    CatalogRepository, FulfillmentRecord, PaymentGateway, RepositoryError, RepositoryResult,
    TopupProvider, TransactionRepository,
};
use topup_core::provider::{PriceListEntry, ProviderError, ProviderStatus, TopupReceipt};

// --- Transactions ------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryTransactions {
    rows: Mutex<HashMap<String, Transaction>>,
}

impl InMemoryTransactions {
    pub fn get(&self, ref_id: &str) -> Option<Transaction> {
        self.rows.lock().unwrap().get(ref_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactions {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&tx.ref_id) {
            return Err(RepositoryError::Conflict(tx.ref_id.clone()));
        }
        rows.insert(tx.ref_id.clone(), tx.clone());
        Ok(())
    }

    async fn find_by_ref_id(&self, ref_id: &str) -> RepositoryResult<Option<Transaction>> {
        Ok(self.rows.lock().unwrap().get(ref_id).cloned())
    }

    async fn update_payment(
        &self,
        ref_id: &str,
        payment_status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let tx = rows
            .get_mut(ref_id)
            .ok_or_else(|| RepositoryError::NotFound(ref_id.to_string()))?;
        tx.payment_status = payment_status;
        if let Some(method) = payment_method {
            tx.payment_method = method.to_string();
        }
        tx.updated_at = Utc::now();
        Ok(())
    }

    async fn claim_for_fulfillment(&self, ref_id: &str) -> RepositoryResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let tx = rows
            .get_mut(ref_id)
            .ok_or_else(|| RepositoryError::NotFound(ref_id.to_string()))?;
        if tx.status != FulfillmentStatus::Pending {
            return Ok(false);
        }
        tx.status = FulfillmentStatus::Processing;
        tx.updated_at = Utc::now();
        Ok(true)
    }

    async fn record_fulfillment(
        &self,
        ref_id: &str,
        record: &FulfillmentRecord,
    ) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let tx = rows
            .get_mut(ref_id)
            .ok_or_else(|| RepositoryError::NotFound(ref_id.to_string()))?;
        tx.status = record.status;
        if record.sn.is_some() {
            tx.sn = record.sn.clone();
        }
        tx.message = Some(record.message.clone());
        if record.amount_cost.is_some() {
            tx.amount_cost = record.amount_cost;
        }
        if record.provider_ref_id.is_some() {
            tx.provider_ref_id = record.provider_ref_id.clone();
        }
        tx.updated_at = Utc::now();
        Ok(())
    }
}

// --- Catalog -----------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<String, Product>>,
    categories: Mutex<Vec<Category>>,
}

impl InMemoryCatalog {
    pub fn with_category(self, category: Category) -> Self {
        self.categories.lock().unwrap().push(category);
        self
    }

    pub fn with_product(self, product: Product) -> Self {
        self.products
            .lock()
            .unwrap()
            .insert(product.sku_code.clone(), product);
        self
    }

    pub fn product(&self, sku_code: &str) -> Option<Product> {
        self.products.lock().unwrap().get(sku_code).cloned()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn find_product(&self, sku_code: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.products.lock().unwrap().get(sku_code).cloned())
    }

    async fn find_product_with_category(
        &self,
        sku_code: &str,
    ) -> RepositoryResult<Option<(Product, Category)>> {
        let product = match self.products.lock().unwrap().get(sku_code).cloned() {
            Some(product) => product,
            None => return Ok(None),
        };
        let category = self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|category| category.id == product.category_id)
            .cloned();
        Ok(category.map(|category| (product, category)))
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn upsert_product(
        &self,
        category_id: Uuid,
        sku_code: &str,
        product_name: &str,
        price_cost: i64,
        price_sell: i64,
        active: bool,
    ) -> RepositoryResult<()> {
        self.products.lock().unwrap().insert(
            sku_code.to_string(),
            Product {
                id: Uuid::new_v4(),
                category_id,
                sku_code: sku_code.to_string(),
                product_name: product_name.to_string(),
                price_cost,
                price_sell,
                active,
            },
        );
        Ok(())
    }
}

// --- Provider ----------------------------------------------------------------

pub enum ProviderBehavior {
    /// Terminal success with the given serial number.
    Succeed { sn: String },
    /// Terminal failure with the given message.
    FailTerminal { message: String },
    /// Still-processing response on every call.
    AlwaysPending,
    /// The call itself errors (network/timeout).
    Error,
}

pub struct FakeProvider {
    pub behavior: ProviderBehavior,
    pub deposit: BigDecimal,
    pub price_entries: Vec<PriceListEntry>,
    pub rate_limited: bool,
    calls: AtomicU32,
}

impl FakeProvider {
    pub fn new(behavior: ProviderBehavior) -> Self {
        Self {
            behavior,
            deposit: BigDecimal::from(1_000_000),
            price_entries: Vec::new(),
            rate_limited: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(ProviderBehavior::Succeed {
            sn: "SN-12345 Username Zeys / Server 2001".into(),
        })
    }

    pub fn with_deposit(mut self, deposit: i64) -> Self {
        self.deposit = BigDecimal::from(deposit);
        self
    }

    pub fn with_price_entries(mut self, entries: Vec<PriceListEntry>) -> Self {
        self.price_entries = entries;
        self
    }

    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopupProvider for FakeProvider {
    async fn create_transaction(
        &self,
        _sku_code: &str,
        _customer_no: &str,
        ref_id: &str,
    ) -> Result<TopupReceipt, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            ProviderBehavior::Succeed { sn } => Ok(TopupReceipt {
                ref_id: ref_id.to_string(),
                status: ProviderStatus::Success,
                sn: Some(sn.clone()),
                message: "Sukses".into(),
                price: Some(13_500),
                rc: Some("00".into()),
            }),
            ProviderBehavior::FailTerminal { message } => Ok(TopupReceipt {
                ref_id: ref_id.to_string(),
                status: ProviderStatus::Failed,
                sn: None,
                message: message.clone(),
                price: None,
                rc: Some("42".into()),
            }),
            ProviderBehavior::AlwaysPending => Ok(TopupReceipt {
                ref_id: ref_id.to_string(),
                status: ProviderStatus::Pending,
                sn: None,
                message: "Sedang diproses".into(),
                price: None,
                rc: Some("03".into()),
            }),
            ProviderBehavior::Error => Err(ProviderError::InvalidResponse(
                "simulated connection timeout".into(),
            )),
        }
    }

    async fn price_list(&self) -> Result<Vec<PriceListEntry>, ProviderError> {
        if self.rate_limited {
            return Err(ProviderError::RateLimited(
                "too many pricelist requests".into(),
            ));
        }
        Ok(self.price_entries.clone())
    }

    async fn balance(&self) -> Result<BigDecimal, ProviderError> {
        Ok(self.deposit.clone())
    }
}

// --- Gateway -----------------------------------------------------------------

#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    last_request: Mutex<Option<SessionRequest>>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<SessionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        if self.fail {
            return Err(GatewayError::Rejected("503: maintenance".into()));
        }
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(PaymentSession {
            token: "snap-token-123".into(),
            redirect_url: Some("https://gateway.test/redirect/snap-token-123".into()),
        })
    }
}

// --- Builders ----------------------------------------------------------------

pub fn category(name: &str, markup_type: &str, percent: &str, flat: i64) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        markup_type: markup_type.to_string(),
        markup_percent: percent.parse().unwrap(),
        markup_flat: BigDecimal::from(flat),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn product(category_id: Uuid, sku_code: &str, cost: i64, sell: i64, active: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        category_id,
        sku_code: sku_code.to_string(),
        product_name: format!("{sku_code} Diamonds"),
        price_cost: cost,
        price_sell: sell,
        active,
    }
}

pub fn pending_transaction(ref_id: &str, sku_code: &str, amount_sell: i64, fee: i64) -> Transaction {
    Transaction::new(
        ref_id.to_string(),
        sku_code.to_string(),
        "123456789".to_string(),
        None,
        Some("+628123456789".to_string()),
        "dana".to_string(),
        amount_sell,
        Some(amount_sell - 1_500),
        fee,
        "snap-token-123".to_string(),
    )
}
