//! Core entities and wire types for the economy backend
//!
//! All JSON field names are camelCase for compatibility with the existing
//! bot client (`clientId`, `betEventId`, ...).

use serde::{Deserialize, Serialize};

/// One signed movement in the balance ledger.
///
/// Positive amount = credit, negative = debit. Never zero. Rows are
/// append-only; current balance is always the sum over an account's rows,
/// never a cached column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOperation {
    pub id: String,
    pub client_id: String,
    pub amount: i64,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A wager-able proposition with exactly two mutually exclusive outcomes.
///
/// State encoding, preserved from the original service:
/// - Active:    `is_active && !is_finished`
/// - Finished:  `is_finished` (winning_option set)
/// - Cancelled: `!is_active && !is_finished`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub option1: String,
    pub option2: String,
    pub is_active: bool,
    pub is_finished: bool,
    pub winning_option: Option<i64>,
    pub total_bet_amount: i64,
    pub option1_bet_amount: i64,
    pub option2_bet_amount: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl BetEvent {
    /// Wagers are accepted and terminal transitions allowed only here.
    pub fn is_open(&self) -> bool {
        self.is_active && !self.is_finished
    }
}

/// One user's stake on one event. At most one per (user, event); immutable
/// once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBet {
    pub id: i64,
    pub user_id: String,
    pub bet_event_id: i64,
    pub chosen_option: i64,
    pub amount: i64,
    pub created_at: String,
}

// ===== Balance API wire types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOperationRequest {
    pub client_id: String,
    pub amount: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: i64,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub sender: BalanceOperation,
    pub receiver: BalanceOperation,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: i64,
}

// ===== Bet API wire types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub option1: String,
    pub option2: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub message: String,
    pub event_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub user_id: String,
    pub bet_event_id: i64,
    pub chosen_option: i64,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetResponse {
    pub message: String,
    pub bet_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub bet_event_id: i64,
    pub winning_option: i64,
}

/// One winner's slice of the pool. Only credits that actually landed on the
/// ledger appear in a finalize response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub user_id: String,
    pub original_bet: i64,
    pub winnings: i64,
    pub profit: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub message: String,
    pub winning_option: i64,
    pub total_pool: i64,
    pub winners_count: usize,
    pub distributions: Vec<Distribution>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelEventResponse {
    pub message: String,
    pub refunded_bets: usize,
    pub total_refunded: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<BetEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsResponse {
    pub event: BetEvent,
    pub total_bets: usize,
    pub option1_bets: usize,
    pub option2_bets: usize,
}

/// A user's wager joined with its event for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBetDetail {
    pub bet_id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub chosen_option: i64,
    pub chosen_option_text: String,
    pub amount: i64,
    pub is_finished: bool,
    pub winning_option: Option<i64>,
    pub is_winner: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserBetsResponse {
    pub bets: Vec<UserBetDetail>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}
