pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod ports;
pub mod pricing;
pub mod provider;
pub mod retry;
pub mod services;
pub mod signature;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::services::{
    CatalogSyncService, CheckoutService, FulfillmentDispatcher, NicknameVerifier,
    NotificationProcessor, StatusService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub checkout: CheckoutService,
    pub notifications: NotificationProcessor,
    pub fulfillment: FulfillmentDispatcher,
    pub nickname: NicknameVerifier,
    pub status: StatusService,
    pub catalog_sync: CatalogSyncService,
    pub payment_webhook_secret: Option<String>,
    pub provider_webhook_secret: Option<String>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/payment/checkout", post(handlers::checkout::checkout))
        .route(
            "/api/v1/payment/notification",
            post(handlers::notification::payment_notification),
        )
        .route(
            "/api/v1/payment/check-nickname",
            post(handlers::nickname::check_nickname),
        )
        .route(
            "/api/v1/provider/webhook",
            post(handlers::notification::provider_webhook),
        )
        .route(
            "/api/v1/transactions/:ref_id",
            get(handlers::status::transaction_status),
        )
        .route("/api/v1/admin/sync-products", post(handlers::admin::sync_products))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
