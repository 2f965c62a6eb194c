use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::CheckoutRequest;
use crate::validation;
use crate::AppState;

/// User-Agent fragments that mark a small-screen client. Device class only
/// changes the gopay fee.
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

#[derive(Debug, Deserialize)]
pub struct CheckoutPayload {
    pub sku_code: String,
    pub customer_no: String,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub ref_id: String,
    pub snap_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_sku_code(&payload.sku_code)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validation::validate_customer_no(&payload.customer_no)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validation::validate_payment_method(&payload.payment_method)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(phone_number) = &payload.phone_number {
        validation::validate_phone_number(phone_number)
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let receipt = state
        .checkout
        .checkout(CheckoutRequest {
            sku_code: payload.sku_code,
            customer_no: payload.customer_no,
            server_id: payload.server_id,
            phone_number: payload.phone_number,
            payment_method: payload.payment_method,
            small_screen: is_small_screen(user_agent),
        })
        .await?;

    Ok(Json(CheckoutResponse {
        ref_id: receipt.ref_id,
        snap_token: receipt.snap_token,
        redirect_url: receipt.redirect_url,
    }))
}

fn is_small_screen(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}
