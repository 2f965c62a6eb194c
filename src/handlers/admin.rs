use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::AppState;

pub async fn sync_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.catalog_sync.sync_products().await?;
    Ok(Json(report))
}
