//! HTTP client for the gateway's session (Snap) API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ports::PaymentGateway;

use super::{GatewayError, PaymentSession, SessionRequest};

#[derive(Clone)]
pub struct SnapClient {
    client: Client,
    base_url: String,
    server_key: String,
}

#[derive(Debug, Serialize)]
struct SnapRequest {
    transaction_details: serde_json::Value,
    customer_details: serde_json::Value,
    enabled_payments: Vec<String>,
    callbacks: serde_json::Value,
    item_details: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: String,
    #[serde(default)]
    redirect_url: Option<String>,
}

impl SnapClient {
    pub fn new(base_url: String, server_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            server_key,
        }
    }
}

#[async_trait]
impl PaymentGateway for SnapClient {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let url = format!("{}/transactions", self.base_url.trim_end_matches('/'));

        let body = SnapRequest {
            transaction_details: json!({
                "order_id": request.order_id,
                "gross_amount": request.gross_amount,
            }),
            customer_details: json!({ "phone": request.phone_number }),
            enabled_payments: vec![request.payment_method.clone()],
            // The gateway appends the order id when redirecting, so every
            // outcome lands the customer on the invoice page.
            callbacks: json!({
                "finish": request.callback_url,
                "error": request.callback_url,
                "pending": request.callback_url,
            }),
            item_details: vec![json!({
                "id": request.item_id,
                "price": request.gross_amount,
                "quantity": 1,
                "name": request.item_name,
            })],
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED || status.is_success() {
            let session: SnapResponse = response
                .json()
                .await
                .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
            return Ok(PaymentSession {
                token: session.token,
                redirect_url: session.redirect_url,
            });
        }

        let detail = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected(format!("{status}: {detail}")))
    }
}
