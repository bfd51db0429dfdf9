//! Bet API - pari-mutuel betting service
//!
//! Owns bet events and wagers; debits stakes and credits winnings through
//! the balance API over HTTP.

use anyhow::Result;
use std::{env, sync::Arc};
use tracing::info;
use wagerhouse_backend::{
    bet::{routes, BetService, BetStore},
    clients::HttpBalanceClient,
    runtime,
};

#[tokio::main]
async fn main() -> Result<()> {
    runtime::load_env();
    runtime::init_tracing();

    info!("🚀 Bet API starting");

    let db_path = runtime::resolve_data_path(env::var("BET_DB_PATH").ok(), "bets.db");
    let store = BetStore::new(&db_path)?;
    info!("📊 Bet database at: {db_path}");

    let ledger = Arc::new(HttpBalanceClient::from_env()?);
    let bets = BetService::new(store, ledger);
    let app = routes::router(bets);

    let port = runtime::port_from_env("BET_API_PORT", 5001);
    runtime::serve(app, "bet-api", port).await
}
