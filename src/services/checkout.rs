//! Checkout orchestration: price + fee, gateway session, pending transaction.

use bigdecimal::BigDecimal;

use crate::domain::{generate_ref_id, Transaction};
use crate::error::AppError;
use crate::gateway::SessionRequest;
use crate::ports::{
    DynCatalogRepository, DynPaymentGateway, DynTopupProvider, DynTransactionRepository,
};
use crate::pricing;

const REF_ID_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub sku_code: String,
    pub customer_no: String,
    pub server_id: Option<String>,
    pub phone_number: Option<String>,
    pub payment_method: String,
    /// Device class of the client, derived from the User-Agent at the edge.
    pub small_screen: bool,
}

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub ref_id: String,
    pub snap_token: String,
    pub redirect_url: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutService {
    transactions: DynTransactionRepository,
    catalog: DynCatalogRepository,
    provider: DynTopupProvider,
    gateway: DynPaymentGateway,
    frontend_base_url: String,
}

impl CheckoutService {
    pub fn new(
        transactions: DynTransactionRepository,
        catalog: DynCatalogRepository,
        provider: DynTopupProvider,
        gateway: DynPaymentGateway,
        frontend_base_url: String,
    ) -> Self {
        Self {
            transactions,
            catalog,
            provider,
            gateway,
            frontend_base_url,
        }
    }

    /// Creates a pending transaction and a gateway session for it.
    ///
    /// Order matters: the balance check and the gateway session both happen
    /// before the insert, so a failed session never leaves an orphan pending
    /// row without a usable payment handle.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, AppError> {
        let product = self
            .catalog
            .find_product(&request.sku_code)
            .await?
            .filter(|product| product.active)
            .ok_or_else(|| AppError::NotFound(format!("product {}", request.sku_code)))?;

        let fee = pricing::payment_fee(
            product.price_sell,
            &request.payment_method,
            request.small_screen,
        );
        let gross_amount = product.price_sell + fee;

        let deposit = self.provider.balance().await?;
        if deposit < BigDecimal::from(product.price_cost) {
            tracing::warn!(
                sku_code = %request.sku_code,
                "provider deposit below product cost, blocking checkout"
            );
            return Err(AppError::UpstreamUnavailable(
                "product temporarily out of stock, please try again later".into(),
            ));
        }

        let ref_id = self.fresh_ref_id().await?;

        let session = self
            .gateway
            .create_session(&SessionRequest {
                order_id: ref_id.clone(),
                gross_amount,
                phone_number: request.phone_number.clone(),
                payment_method: request.payment_method.clone(),
                item_id: product.sku_code.clone(),
                item_name: product.product_name.clone(),
                callback_url: format!(
                    "{}/transaction/{}",
                    self.frontend_base_url.trim_end_matches('/'),
                    ref_id
                ),
            })
            .await?;

        let tx = Transaction::new(
            ref_id.clone(),
            request.sku_code,
            request.customer_no,
            request.server_id,
            request.phone_number,
            request.payment_method,
            product.price_sell,
            Some(product.price_cost),
            fee,
            session.token.clone(),
        );
        self.transactions.insert(&tx).await?;

        tracing::info!(ref_id = %ref_id, amount = gross_amount, "checkout session created");

        Ok(CheckoutReceipt {
            ref_id,
            snap_token: session.token,
            redirect_url: session.redirect_url,
        })
    }

    /// Picks an invoice id not yet present in the store. The unique index on
    /// ref_id remains the backstop for the race between check and insert.
    async fn fresh_ref_id(&self) -> Result<String, AppError> {
        for _ in 0..REF_ID_ATTEMPTS {
            let candidate = generate_ref_id();
            if self
                .transactions
                .find_by_ref_id(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal(
            "could not allocate a unique invoice id".into(),
        ))
    }
}
