//! Payment webhook processing: the state machine over `payment_status`.
//!
//! The gateway delivers notifications at least once with no ordering
//! guarantee. The payment axis is overwritten unconditionally (the gateway is
//! the source of truth there); the fulfillment axis is guarded by an atomic
//! claim so goods are dispatched at most once per invoice.

use serde::Deserialize;

use crate::domain::{FulfillmentStatus, PaymentStatus};
use crate::error::AppError;
use crate::ports::DynTransactionRepository;

use super::FulfillmentDispatcher;

/// Gateway status vocabulary. Deserialization rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayTransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
}

#[derive(Debug, Deserialize)]
pub struct PaymentNotification {
    /// The invoice ref_id, echoed back by the gateway as its order id.
    pub order_id: String,
    pub transaction_status: GatewayTransactionStatus,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Payment confirmed and this delivery won the claim; fulfillment ran.
    Fulfilled(FulfillmentStatus),
    /// Payment confirmed but another delivery already claimed the dispatch.
    AlreadyHandled,
    /// Payment not (yet) successful; only the payment axis moved.
    AwaitingPayment,
}

#[derive(Clone)]
pub struct NotificationProcessor {
    transactions: DynTransactionRepository,
    fulfillment: FulfillmentDispatcher,
}

impl NotificationProcessor {
    pub fn new(transactions: DynTransactionRepository, fulfillment: FulfillmentDispatcher) -> Self {
        Self {
            transactions,
            fulfillment,
        }
    }

    pub async fn process(
        &self,
        notification: &PaymentNotification,
    ) -> Result<NotificationOutcome, AppError> {
        let tx = self
            .transactions
            .find_by_ref_id(&notification.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {}", notification.order_id)))?;

        let paid = payment_succeeded(notification);
        let payment_status = if paid {
            PaymentStatus::Success
        } else {
            map_payment_status(notification.transaction_status)
        };

        self.transactions
            .update_payment(
                &tx.ref_id,
                payment_status,
                notification.payment_type.as_deref(),
            )
            .await?;

        if !paid {
            tracing::info!(
                ref_id = %tx.ref_id,
                payment_status = payment_status.as_str(),
                "payment not settled, no fulfillment"
            );
            return Ok(NotificationOutcome::AwaitingPayment);
        }

        // Idempotency gate: exactly one delivery moves pending -> processing.
        let claimed = self.transactions.claim_for_fulfillment(&tx.ref_id).await?;
        if !claimed {
            tracing::info!(ref_id = %tx.ref_id, "fulfillment already claimed, acknowledging replay");
            return Ok(NotificationOutcome::AlreadyHandled);
        }

        tracing::info!(ref_id = %tx.ref_id, "payment verified, dispatching topup");
        let status = self.fulfillment.dispatch(&tx).await?;
        Ok(NotificationOutcome::Fulfilled(status))
    }
}

/// Payment counts as successful only for capture/settlement with an accepted
/// (or absent) fraud assessment.
fn payment_succeeded(notification: &PaymentNotification) -> bool {
    let captured = matches!(
        notification.transaction_status,
        GatewayTransactionStatus::Capture | GatewayTransactionStatus::Settlement
    );
    let fraud_accepted = notification
        .fraud_status
        .as_deref()
        .map(|fraud| fraud.eq_ignore_ascii_case("accept"))
        .unwrap_or(true);

    captured && fraud_accepted
}

fn map_payment_status(status: GatewayTransactionStatus) -> PaymentStatus {
    match status {
        GatewayTransactionStatus::Pending => PaymentStatus::Pending,
        GatewayTransactionStatus::Expire => PaymentStatus::Expire,
        GatewayTransactionStatus::Cancel => PaymentStatus::Cancel,
        // Captured-but-fraud-flagged lands here as well.
        GatewayTransactionStatus::Deny
        | GatewayTransactionStatus::Capture
        | GatewayTransactionStatus::Settlement => PaymentStatus::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(
        status: GatewayTransactionStatus,
        fraud: Option<&str>,
    ) -> PaymentNotification {
        PaymentNotification {
            order_id: "HRM-000001-INV".into(),
            transaction_status: status,
            fraud_status: fraud.map(String::from),
            payment_type: Some("dana".into()),
        }
    }

    #[test]
    fn settlement_without_fraud_status_is_success() {
        assert!(payment_succeeded(&notification(
            GatewayTransactionStatus::Settlement,
            None
        )));
    }

    #[test]
    fn capture_with_accepted_fraud_is_success() {
        assert!(payment_succeeded(&notification(
            GatewayTransactionStatus::Capture,
            Some("accept")
        )));
    }

    #[test]
    fn capture_with_challenged_fraud_is_not_success() {
        assert!(!payment_succeeded(&notification(
            GatewayTransactionStatus::Capture,
            Some("challenge")
        )));
        assert_eq!(
            map_payment_status(GatewayTransactionStatus::Capture),
            PaymentStatus::Deny
        );
    }

    #[test]
    fn non_capture_statuses_are_never_success() {
        for status in [
            GatewayTransactionStatus::Pending,
            GatewayTransactionStatus::Deny,
            GatewayTransactionStatus::Cancel,
            GatewayTransactionStatus::Expire,
        ] {
            assert!(!payment_succeeded(&notification(status, Some("accept"))));
        }
    }

    #[test]
    fn non_success_statuses_map_directly() {
        assert_eq!(
            map_payment_status(GatewayTransactionStatus::Pending),
            PaymentStatus::Pending
        );
        assert_eq!(
            map_payment_status(GatewayTransactionStatus::Expire),
            PaymentStatus::Expire
        );
        assert_eq!(
            map_payment_status(GatewayTransactionStatus::Cancel),
            PaymentStatus::Cancel
        );
        assert_eq!(
            map_payment_status(GatewayTransactionStatus::Deny),
            PaymentStatus::Deny
        );
    }

    #[test]
    fn notification_deserializes_from_gateway_payload() {
        let raw = r#"{
            "order_id": "HRM-123456-INV",
            "transaction_status": "settlement",
            "fraud_status": "accept",
            "payment_type": "gopay"
        }"#;
        let parsed: PaymentNotification = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.order_id, "HRM-123456-INV");
        assert_eq!(
            parsed.transaction_status,
            GatewayTransactionStatus::Settlement
        );
    }

    #[test]
    fn unknown_status_vocabulary_is_rejected() {
        let raw = r#"{"order_id":"HRM-1-INV","transaction_status":"refund"}"#;
        assert!(serde_json::from_str::<PaymentNotification>(raw).is_err());
    }
}
