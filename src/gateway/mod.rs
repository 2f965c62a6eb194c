//! Payment gateway integration (Midtrans Snap-style checkout sessions).

pub mod client;

pub use client::SnapClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway rejected the session: {0}")]
    Rejected(String),

    #[error("invalid response from gateway: {0}")]
    InvalidResponse(String),
}

/// What the gateway needs to open a checkout session for one invoice.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub order_id: String,
    /// Sell price plus payment fee; the full amount captured from the customer.
    pub gross_amount: i64,
    pub phone_number: Option<String>,
    pub payment_method: String,
    pub item_id: String,
    pub item_name: String,
    /// Customer-facing page the gateway redirects back to for this invoice.
    pub callback_url: String,
}

/// Handle for a created payment session.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: Option<String>,
}
