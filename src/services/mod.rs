pub mod catalog_sync;
pub mod checkout;
pub mod fulfillment;
pub mod nickname;
pub mod notification;
pub mod status;

pub use catalog_sync::{CatalogSyncService, SyncReport};
pub use checkout::{CheckoutReceipt, CheckoutRequest, CheckoutService};
pub use fulfillment::{FulfillmentDispatcher, ProviderUpdateOutcome};
pub use nickname::NicknameVerifier;
pub use notification::{
    GatewayTransactionStatus, NotificationOutcome, NotificationProcessor, PaymentNotification,
};
pub use status::{StatusService, TransactionStatusView};
