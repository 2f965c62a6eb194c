pub mod catalog;
pub mod transaction;

pub use catalog::{Category, Product};
pub use transaction::{generate_ref_id, FulfillmentStatus, PaymentStatus, Transaction};
