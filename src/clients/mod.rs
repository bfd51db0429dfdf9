//! HTTP clients for services this backend depends on

pub mod balance;

pub use balance::{HttpBalanceClient, LedgerGateway};
