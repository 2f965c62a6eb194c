//! Fulfillment dispatch: the single authoritative call to the topup provider
//! that actually delivers goods.
//!
//! Callers must have claimed the transaction first (status moved from
//! `pending` to `processing` via the repository's conditional update), so
//! this call happens at most once per ref_id.

use crate::domain::{FulfillmentStatus, Transaction};
use crate::error::AppError;
use crate::ports::{DynTopupProvider, DynTransactionRepository, FulfillmentRecord};
use crate::provider::{ProviderStatus, TopupReceipt};

#[derive(Clone)]
pub struct FulfillmentDispatcher {
    transactions: DynTransactionRepository,
    provider: DynTopupProvider,
}

/// Result of applying an update from the provider's push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderUpdateOutcome {
    Applied(FulfillmentStatus),
    /// The transaction was not in-flight; terminal states are never reverted.
    Ignored,
}

impl FulfillmentDispatcher {
    pub fn new(transactions: DynTransactionRepository, provider: DynTopupProvider) -> Self {
        Self {
            transactions,
            provider,
        }
    }

    /// Calls the provider for a claimed transaction and records the outcome.
    ///
    /// A provider error here is the critical partial-failure path: payment is
    /// already captured, so the transaction is parked in `unresolved` with
    /// the raw error for manual operator reconciliation. It is never left in
    /// `pending` and never retried automatically.
    pub async fn dispatch(&self, tx: &Transaction) -> Result<FulfillmentStatus, AppError> {
        match self
            .provider
            .create_transaction(&tx.sku_code, &tx.customer_no, &tx.ref_id)
            .await
        {
            Ok(receipt) => {
                let record = record_from_receipt(&receipt);
                self.transactions
                    .record_fulfillment(&tx.ref_id, &record)
                    .await?;
                tracing::info!(
                    ref_id = %tx.ref_id,
                    status = record.status.as_str(),
                    "fulfillment outcome recorded"
                );
                Ok(record.status)
            }
            Err(err) => {
                tracing::error!(ref_id = %tx.ref_id, error = %err, "fulfillment dispatch failed after payment capture");
                let record = FulfillmentRecord {
                    status: FulfillmentStatus::Unresolved,
                    sn: None,
                    message: format!(
                        "payment captured but topup dispatch failed: {err}; manual reconciliation required"
                    ),
                    amount_cost: None,
                    provider_ref_id: None,
                };
                self.transactions
                    .record_fulfillment(&tx.ref_id, &record)
                    .await?;
                Ok(FulfillmentStatus::Unresolved)
            }
        }
    }

    /// Applies a transaction update pushed by the provider. Only `processing`
    /// transactions are touched; anything already terminal (or not yet paid)
    /// ignores the push.
    pub async fn apply_provider_update(
        &self,
        receipt: &TopupReceipt,
    ) -> Result<ProviderUpdateOutcome, AppError> {
        let tx = self
            .transactions
            .find_by_ref_id(&receipt.ref_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {}", receipt.ref_id)))?;

        if tx.status != FulfillmentStatus::Processing {
            tracing::info!(
                ref_id = %receipt.ref_id,
                status = tx.status.as_str(),
                "ignoring provider update for non-in-flight transaction"
            );
            return Ok(ProviderUpdateOutcome::Ignored);
        }

        let record = record_from_receipt(receipt);
        self.transactions
            .record_fulfillment(&receipt.ref_id, &record)
            .await?;
        Ok(ProviderUpdateOutcome::Applied(record.status))
    }
}

fn record_from_receipt(receipt: &TopupReceipt) -> FulfillmentRecord {
    let status = match receipt.status {
        ProviderStatus::Success => FulfillmentStatus::Success,
        ProviderStatus::Failed => FulfillmentStatus::Failed,
        // The provider accepted the order but has not settled it; the push
        // channel delivers the terminal update later.
        ProviderStatus::Pending => FulfillmentStatus::Processing,
    };

    FulfillmentRecord {
        status,
        sn: receipt.sn.clone(),
        message: receipt.message.clone(),
        amount_cost: receipt.price,
        provider_ref_id: Some(receipt.ref_id.clone()),
    }
}
