use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NicknamePayload {
    pub sku_code: String,
    pub customer_no: String,
}

#[derive(Debug, Serialize)]
pub struct NicknameResponse {
    pub success: bool,
    pub nickname: String,
}

pub async fn check_nickname(
    State(state): State<AppState>,
    Json(payload): Json<NicknamePayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_sku_code(&payload.sku_code)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validation::validate_customer_no(&payload.customer_no)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let nickname = state
        .nickname
        .verify(&payload.sku_code, &payload.customer_no)
        .await?;

    Ok(Json(NicknameResponse {
        success: true,
        nickname,
    }))
}
