//! Balance API - the ledger service
//!
//! Append-only ledger of signed balance operations; balances are computed
//! by summation, never cached.

use anyhow::Result;
use std::env;
use tracing::info;
use wagerhouse_backend::{
    ledger::{routes, LedgerService, LedgerStore},
    runtime,
};

#[tokio::main]
async fn main() -> Result<()> {
    runtime::load_env();
    runtime::init_tracing();

    info!("🚀 Balance API starting");

    let db_path = runtime::resolve_data_path(env::var("BALANCE_DB_PATH").ok(), "balance.db");
    let store = LedgerStore::new(&db_path)?;
    info!("📊 Ledger database at: {db_path}");

    let ledger = LedgerService::new(store);
    let app = routes::router(ledger);

    let port = runtime::port_from_env("BALANCE_API_PORT", 5000);
    runtime::serve(app, "balance-api", port).await
}
