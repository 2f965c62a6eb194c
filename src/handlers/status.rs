use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::AppState;

pub async fn transaction_status(
    State(state): State<AppState>,
    Path(ref_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.status.status_view(&ref_id).await?;
    Ok(Json(view))
}
