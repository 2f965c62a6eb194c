//! Topup provider integration (Digiflazz-style prepaid API).

pub mod client;

pub use client::DigiflazzClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider response code signalling price-list rate limiting. Must surface
/// distinctly, never as a generic failure.
pub const RC_RATE_LIMITED: &str = "83";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("rate limited by provider (rc=83): {0}")]
    RateLimited(String),

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("circuit breaker open: provider temporarily unavailable")]
    CircuitOpen,
}

/// The provider's status vocabulary, folded to three states. Anything not
/// recognizably terminal is treated as still-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Success,
    Pending,
    Failed,
}

impl ProviderStatus {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "sukses" | "success" => ProviderStatus::Success,
            "gagal" | "failed" => ProviderStatus::Failed,
            _ => ProviderStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProviderStatus::Pending)
    }
}

/// Outcome of one provider transaction call.
#[derive(Debug, Clone)]
pub struct TopupReceipt {
    pub ref_id: String,
    pub status: ProviderStatus,
    pub sn: Option<String>,
    pub message: String,
    pub price: Option<i64>,
    pub rc: Option<String>,
}

/// One row of the provider's prepaid price list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceListEntry {
    pub brand: String,
    pub buyer_sku_code: String,
    pub product_name: String,
    pub price: i64,
    pub buyer_product_status: bool,
    pub seller_product_status: bool,
}
