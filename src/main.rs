use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topup_core::adapters::{PostgresCatalogRepository, PostgresTransactionRepository};
use topup_core::config::Config;
use topup_core::gateway::SnapClient;
use topup_core::ports::{
    DynCatalogRepository, DynPaymentGateway, DynTopupProvider, DynTransactionRepository,
};
use topup_core::provider::DigiflazzClient;
use topup_core::services::{
    CatalogSyncService, CheckoutService, FulfillmentDispatcher, NicknameVerifier,
    NotificationProcessor, StatusService,
};
use topup_core::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("database migrations completed");

    let transactions: DynTransactionRepository =
        Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let catalog: DynCatalogRepository = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let provider: DynTopupProvider = Arc::new(DigiflazzClient::new(
        config.provider_base_url.clone(),
        config.provider_username.clone(),
        config.provider_api_key.clone(),
    ));
    let gateway: DynPaymentGateway = Arc::new(SnapClient::new(
        config.gateway_snap_url.clone(),
        config.gateway_server_key.clone(),
    ));

    let fulfillment = FulfillmentDispatcher::new(transactions.clone(), provider.clone());
    let state = AppState {
        db: pool,
        checkout: CheckoutService::new(
            transactions.clone(),
            catalog.clone(),
            provider.clone(),
            gateway,
            config.frontend_base_url.clone(),
        ),
        notifications: NotificationProcessor::new(transactions.clone(), fulfillment.clone()),
        fulfillment,
        nickname: NicknameVerifier::new(provider.clone()),
        status: StatusService::new(transactions, catalog.clone()),
        catalog_sync: CatalogSyncService::new(catalog, provider),
        payment_webhook_secret: config.payment_webhook_secret.clone(),
        provider_webhook_secret: config.provider_webhook_secret.clone(),
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
