use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub provider_base_url: String,
    pub provider_username: String,
    pub provider_api_key: String,
    /// Shared secret for the provider's push channel; verification is skipped
    /// when unset.
    pub provider_webhook_secret: Option<String>,
    pub gateway_snap_url: String,
    pub gateway_server_key: String,
    /// Shared secret for payment notifications; verification is skipped when
    /// unset.
    pub payment_webhook_secret: Option<String>,
    /// Base URL the gateway redirects customers back to after payment.
    pub frontend_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://api.digiflazz.com/v1".to_string()),
            provider_username: env::var("PROVIDER_USERNAME")?,
            provider_api_key: env::var("PROVIDER_API_KEY")?,
            provider_webhook_secret: env::var("PROVIDER_WEBHOOK_SECRET").ok(),
            gateway_snap_url: env::var("GATEWAY_SNAP_URL")
                .unwrap_or_else(|_| "https://app.midtrans.com/snap/v1".to_string()),
            gateway_server_key: env::var("GATEWAY_SERVER_KEY")?,
            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").ok(),
            frontend_base_url: env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "https://store.herama.my.id".to_string()),
        })
    }
}
