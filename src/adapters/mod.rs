pub mod postgres;

pub use postgres::{PostgresCatalogRepository, PostgresTransactionRepository};
