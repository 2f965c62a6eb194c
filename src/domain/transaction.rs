//! Transaction domain entity.
//!
//! A transaction tracks two independent axes: `payment_status` is the payment
//! gateway's view of whether money was captured, `status` is the fulfillment
//! outcome against the topup provider. They must be reasoned about jointly;
//! neither is derivable from the other.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fulfillment outcome axis.
///
/// `processing` marks a transaction claimed for dispatch by exactly one
/// webhook delivery; `unresolved` is the durable partial-failure state where
/// payment was captured but the provider call did not reach a terminal
/// result. Unresolved rows are for manual operator reconciliation and are
/// never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Unresolved,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::Processing => "processing",
            FulfillmentStatus::Success => "success",
            FulfillmentStatus::Failed => "failed",
            FulfillmentStatus::Unresolved => "unresolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(FulfillmentStatus::Pending),
            "processing" => Some(FulfillmentStatus::Processing),
            "success" => Some(FulfillmentStatus::Success),
            "failed" => Some(FulfillmentStatus::Failed),
            "unresolved" => Some(FulfillmentStatus::Unresolved),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Success | FulfillmentStatus::Failed | FulfillmentStatus::Unresolved
        )
    }
}

/// Payment outcome axis, owned by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Expire,
    Deny,
    Cancel,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Expire => "expire",
            PaymentStatus::Deny => "deny",
            PaymentStatus::Cancel => "cancel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "success" => Some(PaymentStatus::Success),
            "expire" => Some(PaymentStatus::Expire),
            "deny" => Some(PaymentStatus::Deny),
            "cancel" => Some(PaymentStatus::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub ref_id: String,
    pub sku_code: String,
    pub customer_no: String,
    pub server_id: Option<String>,
    pub phone_number: Option<String>,
    pub payment_method: String,
    /// Price charged to the customer, fixed at checkout and never recomputed.
    pub amount_sell: i64,
    /// Provider cost; the provider's actual price overwrites it post-fulfillment.
    pub amount_cost: Option<i64>,
    pub fee: i64,
    pub status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    /// Serial number, the proof of delivery from the provider.
    pub sn: Option<String>,
    pub message: Option<String>,
    pub provider_ref_id: Option<String>,
    /// Payment-session handle issued by the gateway at checkout.
    pub snap_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ref_id: String,
        sku_code: String,
        customer_no: String,
        server_id: Option<String>,
        phone_number: Option<String>,
        payment_method: String,
        amount_sell: i64,
        amount_cost: Option<i64>,
        fee: i64,
        snap_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ref_id,
            sku_code,
            customer_no,
            server_id,
            phone_number,
            payment_method,
            amount_sell,
            amount_cost,
            fee,
            status: FulfillmentStatus::Pending,
            payment_status: PaymentStatus::Pending,
            sn: None,
            message: None,
            provider_ref_id: None,
            snap_token,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total amount charged through the gateway.
    pub fn total(&self) -> i64 {
        self.amount_sell + self.fee
    }
}

/// Generates an externally visible invoice id in the `HRM-######-INV` format.
/// Uniqueness is enforced by the persistence layer; the caller re-generates
/// on collision.
pub fn generate_ref_id() -> String {
    let number: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("HRM-{number:06}-INV")
}
