//! Balance ledger: append-only store + service + HTTP binding

pub mod routes;
pub mod service;
pub mod store;

pub use service::LedgerService;
pub use store::LedgerStore;
