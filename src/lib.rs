//! Wagerhouse Backend Library
//!
//! Virtual-economy backend behind the Discord bot: an append-only balance
//! ledger service and a pari-mutuel betting service, each with its own
//! SQLite store and HTTP surface. Exposed as a library for the service
//! binaries and the integration tests.

pub mod bet;
pub mod clients;
pub mod error;
pub mod ledger;
pub mod models;
pub mod runtime;
