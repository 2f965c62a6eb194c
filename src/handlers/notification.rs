//! Inbound webhook endpoints: payment notifications from the gateway and
//! transaction updates pushed by the provider.
//!
//! Both verify the signature over the raw body before any parsing, so a
//! tampered payload is rejected with 401 and no state mutation. Processed
//! notifications are acknowledged with 200 even when fulfillment was skipped,
//! so the gateway stops retrying already-handled deliveries.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::provider::{ProviderStatus, TopupReceipt};
use crate::services::{NotificationOutcome, PaymentNotification};
use crate::signature::{verify_hmac_sha1, verify_hmac_sha256};
use crate::AppState;

const PAYMENT_SIGNATURE_HEADER: &str = "x-callback-signature";
const PROVIDER_SIGNATURE_HEADER: &str = "x-hub-signature";

pub async fn payment_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if let Some(secret) = &state.payment_webhook_secret {
        let signature = header_value(&headers, PAYMENT_SIGNATURE_HEADER);
        if !verify_hmac_sha256(secret, &body, signature) {
            return Err(AppError::Unauthorized("invalid webhook signature".into()));
        }
    }

    let notification: PaymentNotification = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("malformed notification: {e}")))?;

    tracing::info!(order_id = %notification.order_id, "payment notification received");

    let outcome = state.notifications.process(&notification).await?;
    match outcome {
        NotificationOutcome::Fulfilled(status) => {
            tracing::info!(order_id = %notification.order_id, status = status.as_str(), "fulfillment dispatched");
        }
        NotificationOutcome::AlreadyHandled => {
            tracing::info!(order_id = %notification.order_id, "duplicate delivery acknowledged");
        }
        NotificationOutcome::AwaitingPayment => {}
    }

    Ok((StatusCode::OK, "OK"))
}

#[derive(Debug, Deserialize)]
struct ProviderWebhookPayload {
    data: ProviderWebhookData,
}

#[derive(Debug, Deserialize)]
struct ProviderWebhookData {
    ref_id: String,
    status: String,
    #[serde(default)]
    sn: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    price: Option<i64>,
    #[serde(default)]
    rc: Option<String>,
}

pub async fn provider_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if let Some(secret) = &state.provider_webhook_secret {
        let signature = header_value(&headers, PROVIDER_SIGNATURE_HEADER);
        if !verify_hmac_sha1(secret, &body, signature) {
            return Err(AppError::Unauthorized("invalid webhook signature".into()));
        }
    }

    let payload: ProviderWebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("malformed provider update: {e}")))?;
    let data = payload.data;

    tracing::info!(ref_id = %data.ref_id, status = %data.status, "provider update received");

    let receipt = TopupReceipt {
        ref_id: data.ref_id,
        status: ProviderStatus::parse(&data.status),
        sn: data.sn.filter(|sn| !sn.is_empty()),
        message: data.message.unwrap_or_default(),
        price: data.price,
        rc: data.rc,
    };

    state.fulfillment.apply_provider_update(&receipt).await?;

    Ok((StatusCode::OK, "OK"))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
