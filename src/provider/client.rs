//! HTTP client for the topup provider API.
//!
//! Every call is signed with `md5(username + api_key + salt)` where the salt
//! is the ref id for transactions and a fixed command word otherwise. Calls
//! run behind a circuit breaker so a flapping provider fails fast instead of
//! holding customer-facing requests on timeouts.

use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::TopupProvider;
use crate::signature::md5_hex;

use super::{PriceListEntry, ProviderError, ProviderStatus, TopupReceipt, RC_RATE_LIMITED};

const PRICELIST_SALT: &str = "pricelist";
const BALANCE_SALT: &str = "depo";

type Breaker = StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>;

#[derive(Clone)]
pub struct DigiflazzClient {
    client: Client,
    base_url: String,
    username: String,
    api_key: String,
    circuit_breaker: Breaker,
}

#[derive(Debug, Serialize)]
struct TransactionRequest<'a> {
    username: &'a str,
    buyer_sku_code: &'a str,
    customer_no: &'a str,
    ref_id: &'a str,
    sign: String,
}

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    cmd: &'a str,
    username: &'a str,
    sign: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
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

/// The price-list endpoint answers with either the list or an error object
/// carrying `rc`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceListData {
    Entries(Vec<PriceListEntry>),
    Error {
        rc: String,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct BalanceData {
    deposit: BigDecimal,
}

impl DigiflazzClient {
    pub fn new(base_url: String, username: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Self {
            client,
            base_url,
            username,
            api_key,
            circuit_breaker,
        }
    }

    fn sign(&self, salt: &str) -> String {
        md5_hex(&format!("{}{}{}", self.username, self.api_key, salt))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn guarded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match self.circuit_breaker.call(fut).await {
            Ok(value) => Ok(value),
            Err(FailsafeError::Inner(err)) => Err(err),
            Err(FailsafeError::Rejected) => Err(ProviderError::CircuitOpen),
        }
    }
}

#[async_trait]
impl TopupProvider for DigiflazzClient {
    async fn create_transaction(
        &self,
        sku_code: &str,
        customer_no: &str,
        ref_id: &str,
    ) -> Result<TopupReceipt, ProviderError> {
        let url = self.url("transaction");
        let body = TransactionRequest {
            username: &self.username,
            buyer_sku_code: sku_code,
            customer_no,
            ref_id,
            sign: self.sign(ref_id),
        };
        let client = self.client.clone();

        let data = self
            .guarded(async move {
                let response = client.post(&url).json(&body).send().await?;
                let envelope: Envelope<TransactionData> = response.json().await?;
                Ok(envelope.data)
            })
            .await?;

        Ok(TopupReceipt {
            ref_id: data.ref_id,
            status: ProviderStatus::parse(&data.status),
            sn: data.sn.filter(|sn| !sn.is_empty()),
            message: data.message.unwrap_or_default(),
            price: data.price,
            rc: data.rc,
        })
    }

    async fn price_list(&self) -> Result<Vec<PriceListEntry>, ProviderError> {
        let url = self.url("price-list");
        let body = CommandRequest {
            cmd: "prepaid",
            username: &self.username,
            sign: self.sign(PRICELIST_SALT),
        };
        let client = self.client.clone();

        let data = self
            .guarded(async move {
                let response = client.post(&url).json(&body).send().await?;
                let envelope: Envelope<PriceListData> = response.json().await?;
                Ok(envelope.data)
            })
            .await?;

        match data {
            PriceListData::Entries(entries) => Ok(entries),
            PriceListData::Error { rc, message } => {
                let message = message.unwrap_or_else(|| "price list unavailable".into());
                if rc == RC_RATE_LIMITED {
                    Err(ProviderError::RateLimited(message))
                } else {
                    Err(ProviderError::InvalidResponse(format!(
                        "rc={rc}: {message}"
                    )))
                }
            }
        }
    }

    async fn balance(&self) -> Result<BigDecimal, ProviderError> {
        let url = self.url("cek-saldo");
        let body = CommandRequest {
            cmd: "deposit",
            username: &self.username,
            sign: self.sign(BALANCE_SALT),
        };
        let client = self.client.clone();

        let data = self
            .guarded(async move {
                let response = client.post(&url).json(&body).send().await?;
                let envelope: Envelope<BalanceData> = response.json().await?;
                Ok(envelope.data)
            })
            .await?;

        Ok(data.deposit)
    }
}
