//! End-to-end bet lifecycle tests
//!
//! Runs the bet service against real (in-memory) SQLite stores with the
//! ledger wired in-process instead of over HTTP, so the full
//! debit -> wager -> settle/refund -> credit flow is exercised without a
//! network.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use wagerhouse_backend::{
    bet::{BetService, BetStore},
    clients::LedgerGateway,
    ledger::{LedgerService, LedgerStore},
};

/// LedgerGateway implemented directly over a LedgerService.
struct DirectLedgerGateway {
    ledger: LedgerService,
}

#[async_trait]
impl LedgerGateway for DirectLedgerGateway {
    async fn balance(&self, user_id: &str) -> Result<i64> {
        self.ledger
            .balance(user_id)
            .await
            .map_err(|e| anyhow::anyhow!("{e:?}"))
    }

    async fn credit(&self, user_id: &str, amount: i64, description: &str) -> Result<()> {
        self.ledger
            .credit(user_id, amount, description)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{e:?}"))
    }

    async fn debit(&self, user_id: &str, amount: i64, description: &str) -> Result<()> {
        self.ledger
            .debit(user_id, amount, description)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{e:?}"))
    }
}

fn economy() -> (LedgerService, BetService) {
    let ledger = LedgerService::new(LedgerStore::new(":memory:").unwrap());
    let bets = BetService::new(
        BetStore::new(":memory:").unwrap(),
        Arc::new(DirectLedgerGateway {
            ledger: ledger.clone(),
        }),
    );
    (ledger, bets)
}

#[tokio::test]
async fn cats_vs_dogs_end_to_end() {
    let (ledger, bets) = economy();
    ledger.credit("A", 500, "seed").await.unwrap();
    ledger.credit("B", 500, "seed").await.unwrap();

    let event = bets
        .create_event("Cats vs Dogs", "The eternal question", "Cats", "Dogs")
        .await
        .unwrap();

    bets.place_bet("A", event.id, 1, 200).await.unwrap();
    bets.place_bet("B", event.id, 2, 300).await.unwrap();

    let summary = bets.finalize(event.id, 2).await.unwrap();
    assert_eq!(summary.total_pool, 500);
    assert_eq!(summary.distributions.len(), 1);
    assert_eq!(summary.distributions[0].user_id, "B");
    // B's payout = floor(500 * 300/300) = 500.
    assert_eq!(summary.distributions[0].winnings, 500);
    assert_eq!(summary.distributions[0].profit, 200);

    // B: 500 - 300 + 500 = 700; A: 500 - 200 = 300.
    assert_eq!(ledger.balance("B").await.unwrap(), 700);
    assert_eq!(ledger.balance("A").await.unwrap(), 300);
}

#[tokio::test]
async fn truncated_settlement_leaves_remainder_unpaid() {
    let (ledger, bets) = economy();
    for user in ["a", "b", "c", "loser"] {
        ledger.credit(user, 100, "seed").await.unwrap();
    }

    let event = bets
        .create_event("Coin flip", "", "Heads", "Tails")
        .await
        .unwrap();
    bets.place_bet("a", event.id, 1, 1).await.unwrap();
    bets.place_bet("b", event.id, 1, 1).await.unwrap();
    bets.place_bet("c", event.id, 1, 1).await.unwrap();
    bets.place_bet("loser", event.id, 2, 7).await.unwrap();

    // Pool 10, winning total 3: each winner gets floor(10/3) = 3 and the
    // leftover 1 is paid to no one.
    let summary = bets.finalize(event.id, 1).await.unwrap();
    assert_eq!(summary.total_pool, 10);
    assert_eq!(summary.winning_option, 1);
    assert_eq!(summary.distributions.len(), 3);
    assert!(summary.distributions.iter().all(|d| d.winnings == 3));

    for user in ["a", "b", "c"] {
        assert_eq!(ledger.balance(user).await.unwrap(), 102);
    }
    assert_eq!(ledger.balance("loser").await.unwrap(), 93);

    // 1 coin left the circulating supply with the truncation.
    let total: i64 = ledger.balance("a").await.unwrap()
        + ledger.balance("b").await.unwrap()
        + ledger.balance("c").await.unwrap()
        + ledger.balance("loser").await.unwrap();
    assert_eq!(total, 399);
}

#[tokio::test]
async fn no_winner_settlement_changes_no_balances() {
    let (ledger, bets) = economy();
    ledger.credit("A", 500, "seed").await.unwrap();

    let event = bets.create_event("Solo", "", "Yes", "No").await.unwrap();
    bets.place_bet("A", event.id, 1, 200).await.unwrap();

    let summary = bets.finalize(event.id, 2).await.unwrap();
    assert_eq!(summary.distributions.len(), 0);
    assert_eq!(ledger.balance("A").await.unwrap(), 300);

    let finished = bets.finished_events().await.unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].winning_option, Some(2));
}

#[tokio::test]
async fn cancellation_refunds_original_stakes() {
    let (ledger, bets) = economy();
    ledger.credit("A", 500, "seed").await.unwrap();
    ledger.credit("B", 300, "seed").await.unwrap();

    let event = bets.create_event("Maybe", "", "Yes", "No").await.unwrap();
    bets.place_bet("A", event.id, 1, 450).await.unwrap();
    bets.place_bet("B", event.id, 2, 50).await.unwrap();

    let refund = bets.cancel(event.id).await.unwrap();
    assert_eq!(refund.refunded_bets, 2);
    assert_eq!(refund.total_refunded, 500);

    // Each bettor gets exactly their own stake back.
    assert_eq!(ledger.balance("A").await.unwrap(), 500);
    assert_eq!(ledger.balance("B").await.unwrap(), 300);

    // Cancelled events are neither active nor finished.
    assert!(bets.active_events().await.unwrap().is_empty());
    assert!(bets.finished_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_wagers_leave_no_ledger_trace() {
    let (ledger, bets) = economy();
    ledger.credit("A", 100, "seed").await.unwrap();

    let event = bets.create_event("Strict", "", "Yes", "No").await.unwrap();

    assert!(bets.place_bet("A", event.id, 1, 500).await.is_err()); // funds
    assert!(bets.place_bet("A", event.id, 9, 10).await.is_err()); // option
    assert!(bets.place_bet("A", event.id, 1, -5).await.is_err()); // amount

    assert_eq!(ledger.balance("A").await.unwrap(), 100);
    assert_eq!(ledger.operations("A").await.unwrap().len(), 1);

    let (details, wagers) = bets.event_details(event.id).await.unwrap();
    assert_eq!(details.total_bet_amount, 0);
    assert!(wagers.is_empty());
}

#[tokio::test]
async fn transfer_conservation_alongside_betting() {
    let (ledger, bets) = economy();
    ledger.credit("A", 400, "seed").await.unwrap();
    ledger.credit("B", 100, "seed").await.unwrap();

    ledger.transfer("A", "B", 150, "loan").await.unwrap();
    assert_eq!(ledger.balance("A").await.unwrap(), 250);
    assert_eq!(ledger.balance("B").await.unwrap(), 250);

    let event = bets.create_event("Even", "", "Yes", "No").await.unwrap();
    bets.place_bet("A", event.id, 1, 250).await.unwrap();
    bets.place_bet("B", event.id, 2, 250).await.unwrap();
    bets.finalize(event.id, 1).await.unwrap();

    // Winner takes the whole pool; total supply is unchanged.
    assert_eq!(ledger.balance("A").await.unwrap(), 500);
    assert_eq!(ledger.balance("B").await.unwrap(), 0);
}
