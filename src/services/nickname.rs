//! Pre-checkout account probe: validates a customer-entered account id by
//! dry-running the provider's transaction primitive with a throwaway ref id.
//!
//! The caller is a human waiting on a form, so the probe retries transient
//! provider states under a hard bound (5 attempts, 2s apart, ~10s worst
//! case) and never surfaces them as errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::AppError;
use crate::ports::DynTopupProvider;
use crate::provider::ProviderStatus;
use crate::retry::{Attempt, RetryPolicy};

const MAX_ATTEMPTS: u32 = 5;
const ATTEMPT_INTERVAL: Duration = Duration::from_secs(2);

/// The provider embeds the account name in the free-text serial field,
/// after this marker and before the next separator.
const NICKNAME_MARKER: &str = "Username ";
const NICKNAME_SEPARATOR: &str = " /";

const FALLBACK_NICKNAME: &str = "Please make sure the account ID is correct";
const WRONG_ACCOUNT_MESSAGE: &str =
    "Account ID or server not found. Please double-check your account details before paying.";

/// Failure phrases that indicate a mistyped account id rather than a
/// provider-side problem. The provider answers in both vocabularies.
const WRONG_ACCOUNT_PHRASES: &[&str] = &[
    "tujuan salah",
    "tidak ditemukan",
    "wrong destination",
    "not found",
    "invalid",
];

#[derive(Clone)]
pub struct NicknameVerifier {
    provider: DynTopupProvider,
    policy: RetryPolicy,
}

enum Probe {
    Name(String),
    Rejected(String),
}

impl NicknameVerifier {
    pub fn new(provider: DynTopupProvider) -> Self {
        Self::with_policy(provider, RetryPolicy::new(MAX_ATTEMPTS, ATTEMPT_INTERVAL))
    }

    pub fn with_policy(provider: DynTopupProvider, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Resolves the display name behind `customer_no`, or a user-facing
    /// validation error when the provider says the account does not exist.
    /// Attempt exhaustion returns a best-effort message, not an error.
    pub async fn verify(&self, sku_code: &str, customer_no: &str) -> Result<String, AppError> {
        let ref_id = format!("CHK-{}", Utc::now().timestamp_millis());

        let outcome = self
            .policy
            .run(|attempt| {
                let provider = Arc::clone(&self.provider);
                let sku_code = sku_code.to_owned();
                let customer_no = customer_no.to_owned();
                let ref_id = ref_id.clone();
                async move {
                    tracing::debug!(attempt, %ref_id, "nickname probe");
                    let receipt = provider
                        .create_transaction(&sku_code, &customer_no, &ref_id)
                        .await?;

                    match receipt.status {
                        ProviderStatus::Success => Ok::<Attempt<Probe>, AppError>(Attempt::Terminal(Probe::Name(
                            extract_nickname(receipt.sn.as_deref()),
                        ))),
                        ProviderStatus::Failed => Ok(Attempt::Terminal(Probe::Rejected(
                            friendly_failure(&receipt.message),
                        ))),
                        ProviderStatus::Pending => Ok(Attempt::Transient),
                    }
                }
            })
            .await?;

        match outcome {
            Some(Probe::Name(nickname)) => Ok(nickname),
            Some(Probe::Rejected(message)) => Err(AppError::Validation(message)),
            None => Ok(FALLBACK_NICKNAME.to_string()),
        }
    }
}

/// Pulls the display name out of the provider's free-text serial field.
fn extract_nickname(sn: Option<&str>) -> String {
    let Some(sn) = sn else {
        return FALLBACK_NICKNAME.to_string();
    };

    match sn.split_once(NICKNAME_MARKER) {
        Some((_, rest)) => rest
            .split(NICKNAME_SEPARATOR)
            .next()
            .unwrap_or(rest)
            .trim()
            .to_string(),
        None => sn.to_string(),
    }
}

fn friendly_failure(message: &str) -> String {
    if message.trim().is_empty() {
        return "Transaction failed".to_string();
    }

    let lowered = message.to_lowercase();
    if WRONG_ACCOUNT_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
    {
        WRONG_ACCOUNT_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}
