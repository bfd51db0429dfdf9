//! HTTP binding for the Ledger Service (balance API)

use crate::error::ApiError;
use crate::ledger::service::LedgerService;
use crate::models::{
    BalanceOperation, BalanceOperationRequest, BalanceResponse, HealthResponse,
    TransactionRequest, TransactionResponse,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};

pub fn router(ledger: LedgerService) -> Router {
    Router::new()
        .route("/balance/add", post(add_balance))
        .route("/balance/subtract", post(subtract_balance))
        .route("/balance/transaction", post(create_transaction))
        .route("/balance/operations/:user_id", get(get_operations))
        .route("/balance/:user_id", get(get_balance))
        .route("/health", get(health))
        .with_state(ledger)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "balance-api",
    })
}

async fn add_balance(
    State(ledger): State<LedgerService>,
    Json(req): Json<BalanceOperationRequest>,
) -> Result<Json<BalanceOperation>, ApiError> {
    let op = ledger
        .credit(&req.client_id, req.amount, &req.description)
        .await?;
    Ok(Json(op))
}

async fn subtract_balance(
    State(ledger): State<LedgerService>,
    Json(req): Json<BalanceOperationRequest>,
) -> Result<Json<BalanceOperation>, ApiError> {
    let op = ledger
        .debit(&req.client_id, req.amount, &req.description)
        .await?;
    Ok(Json(op))
}

async fn create_transaction(
    State(ledger): State<LedgerService>,
    Json(req): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let (sender, receiver) = ledger
        .transfer(&req.sender_id, &req.receiver_id, req.amount, &req.description)
        .await?;
    Ok(Json(TransactionResponse { sender, receiver }))
}

async fn get_balance(
    State(ledger): State<LedgerService>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = ledger.balance(&user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

async fn get_operations(
    State(ledger): State<LedgerService>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<BalanceOperation>>, ApiError> {
    let ops = ledger.operations(&user_id).await?;
    Ok(Json(ops))
}
