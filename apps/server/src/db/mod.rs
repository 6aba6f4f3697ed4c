//! Database layer - storage traits and backends

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{BankingStore, NewPayment, PaymentSearch, StoreTransaction};
