//! Betting: event/wager store, pari-mutuel settlement, refunds, HTTP binding

pub mod routes;
pub mod service;
pub mod settlement;
pub mod store;

pub use service::{BetService, RefundSummary, SettlementSummary};
pub use store::{BetStore, WagerInsert};
