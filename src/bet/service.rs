//! Bet Service
//!
//! Orchestration over the bet store and the ledger gateway: wager admission
//! control, pari-mutuel settlement, and cancellation refunds. Holds no
//! persistent state of its own.

use crate::bet::settlement::proportional_payouts;
use crate::bet::store::{BetStore, WagerInsert};
use crate::clients::LedgerGateway;
use crate::error::ApiError;
use crate::models::{BetEvent, Distribution, UserBet, UserBetDetail};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of a successful finalize.
#[derive(Debug)]
pub struct SettlementSummary {
    pub winning_option: i64,
    pub total_pool: i64,
    pub distributions: Vec<Distribution>,
}

/// Result of a successful cancellation. Counts and totals cover confirmed
/// refunds only; failed credits are logged for reconciliation.
#[derive(Debug)]
pub struct RefundSummary {
    pub refunded_bets: usize,
    pub total_refunded: i64,
}

#[derive(Clone)]
pub struct BetService {
    store: BetStore,
    ledger: Arc<dyn LedgerGateway>,
}

impl BetService {
    pub fn new(store: BetStore, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { store, ledger }
    }

    pub async fn create_event(
        &self,
        title: &str,
        description: &str,
        option1: &str,
        option2: &str,
    ) -> Result<BetEvent, ApiError> {
        let event = self
            .store
            .create_event(title, description, option1, option2)
            .await?;
        info!(event_id = event.id, title, "🎲 Created bet event");
        Ok(event)
    }

    /// Admission control and placement (checks in contract order): option,
    /// amount, event open, duplicate, funds, debit, then the transactional
    /// wager insert + pool update.
    pub async fn place_bet(
        &self,
        user_id: &str,
        event_id: i64,
        chosen_option: i64,
        amount: i64,
    ) -> Result<UserBet, ApiError> {
        if chosen_option != 1 && chosen_option != 2 {
            return Err(ApiError::Validation(
                "Chosen option must be 1 or 2".to_string(),
            ));
        }
        if amount <= 0 {
            return Err(ApiError::Validation(
                "Bet amount must be positive".to_string(),
            ));
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .filter(BetEvent::is_open)
            .ok_or_else(|| ApiError::NotFound("Event not found or not active".to_string()))?;

        if self.store.find_wager(user_id, event_id).await?.is_some() {
            return Err(ApiError::Conflict(
                "User already placed a bet on this event".to_string(),
            ));
        }

        // Funds policy lives here, not in the ledger.
        let balance = self
            .ledger
            .balance(user_id)
            .await
            .map_err(|e| ApiError::Dependency(format!("Balance check failed: {e}")))?;
        if balance < amount {
            return Err(ApiError::InsufficientFunds(
                "Insufficient balance".to_string(),
            ));
        }

        let description = format!("Bet on {}", event.title);
        self.ledger
            .debit(user_id, amount, &description)
            .await
            .map_err(|e| ApiError::Dependency(format!("Failed to subtract balance: {e}")))?;

        // The debit and the wager insert live in different services; if the
        // insert loses the race we compensate with a refund credit rather
        // than leave the stake debited with no wager.
        match self
            .store
            .insert_wager(user_id, event_id, chosen_option, amount)
            .await
        {
            Ok(WagerInsert::Placed(bet)) => {
                info!(
                    user_id,
                    event_id,
                    bet_id = bet.id,
                    amount,
                    "🎟️ Bet placed"
                );
                Ok(bet)
            }
            Ok(WagerInsert::Duplicate) => {
                self.compensate_debit(user_id, amount, &event.title).await;
                Err(ApiError::Conflict(
                    "User already placed a bet on this event".to_string(),
                ))
            }
            Ok(WagerInsert::EventNotOpen) => {
                self.compensate_debit(user_id, amount, &event.title).await;
                Err(ApiError::NotFound(
                    "Event not found or not active".to_string(),
                ))
            }
            Err(err) => {
                self.compensate_debit(user_id, amount, &event.title).await;
                Err(ApiError::Internal(err))
            }
        }
    }

    async fn compensate_debit(&self, user_id: &str, amount: i64, title: &str) {
        let description = format!("Refund: failed bet on {title}");
        if let Err(e) = self.ledger.credit(user_id, amount, &description).await {
            // Unrecoverable here: a debited stake with no wager. Must be
            // visible for manual reconciliation.
            error!(user_id, amount, "Compensating credit failed: {e:#}");
        } else {
            warn!(user_id, amount, "Compensated debit for rejected wager");
        }
    }

    /// Settle an event: claim the terminal transition, then pay every
    /// winner their proportional share of the pool. One winner's failed
    /// credit never blocks the others.
    pub async fn finalize(
        &self,
        event_id: i64,
        winning_option: i64,
    ) -> Result<SettlementSummary, ApiError> {
        if winning_option != 1 && winning_option != 2 {
            return Err(ApiError::Validation(
                "Winning option must be 1 or 2".to_string(),
            ));
        }

        // Claiming the transition first is what stops two concurrent
        // finalize calls from both paying out. Once it lands, no new wager
        // can touch the pools, so the snapshot read below is final.
        if !self.store.mark_finished(event_id, winning_option).await? {
            return Err(ApiError::NotFound(
                "Event not found or already finished".to_string(),
            ));
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound("Event not found or already finished".to_string())
            })?;

        let winners = self
            .store
            .wagers_for_event_option(event_id, winning_option)
            .await?;
        let payouts = proportional_payouts(event.total_bet_amount, &winners);

        if payouts.is_empty() {
            info!(event_id, "🏁 Event finished with no winners");
            return Ok(SettlementSummary {
                winning_option,
                total_pool: event.total_bet_amount,
                distributions: Vec::new(),
            });
        }

        let description = format!(
            "Winnings from {} - Option {winning_option}",
            event.title
        );
        let mut distributions = Vec::new();
        for share in payouts {
            if share.payout == 0 {
                continue;
            }
            match self
                .ledger
                .credit(&share.user_id, share.payout, &description)
                .await
            {
                Ok(()) => {
                    info!(
                        user_id = %share.user_id,
                        payout = share.payout,
                        "💵 Distributed winnings"
                    );
                    distributions.push(Distribution {
                        user_id: share.user_id,
                        original_bet: share.stake,
                        winnings: share.payout,
                        profit: share.payout - share.stake,
                    });
                }
                Err(e) => {
                    // Unpaid winnings: logged and skipped, settlement
                    // continues for the remaining winners.
                    error!(
                        user_id = %share.user_id,
                        payout = share.payout,
                        "Failed to credit winnings: {e:#}"
                    );
                }
            }
        }

        info!(
            event_id,
            winners = distributions.len(),
            "🏁 Finalized event"
        );
        Ok(SettlementSummary {
            winning_option,
            total_pool: event.total_bet_amount,
            distributions,
        })
    }

    /// Cancel an event and return every wager's stake to its owner.
    pub async fn cancel(&self, event_id: i64) -> Result<RefundSummary, ApiError> {
        if !self.store.mark_cancelled(event_id).await? {
            return Err(ApiError::NotFound(
                "Event not found or already finished".to_string(),
            ));
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound("Event not found or already finished".to_string())
            })?;

        let wagers = self.store.wagers_for_event(event_id).await?;
        let description = format!("Refund for cancelled event: {}", event.title);

        let mut refunded_bets = 0;
        let mut total_refunded = 0;
        for wager in &wagers {
            match self
                .ledger
                .credit(&wager.user_id, wager.amount, &description)
                .await
            {
                Ok(()) => {
                    refunded_bets += 1;
                    total_refunded += wager.amount;
                    info!(
                        user_id = %wager.user_id,
                        amount = wager.amount,
                        "↩️ Refunded wager"
                    );
                }
                Err(e) => {
                    error!(
                        user_id = %wager.user_id,
                        amount = wager.amount,
                        "Failed to refund wager: {e:#}"
                    );
                }
            }
        }

        info!(event_id, refunded_bets, "🚫 Cancelled event");
        Ok(RefundSummary {
            refunded_bets,
            total_refunded,
        })
    }

    pub async fn active_events(&self) -> Result<Vec<BetEvent>, ApiError> {
        Ok(self.store.active_events().await?)
    }

    pub async fn finished_events(&self) -> Result<Vec<BetEvent>, ApiError> {
        Ok(self.store.finished_events().await?)
    }

    /// Event plus aggregate wager counts per option.
    pub async fn event_details(
        &self,
        event_id: i64,
    ) -> Result<(BetEvent, Vec<UserBet>), ApiError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;
        let wagers = self.store.wagers_for_event(event_id).await?;
        Ok((event, wagers))
    }

    /// A user's wagers, each joined with its event for display.
    pub async fn user_bets(&self, user_id: &str) -> Result<Vec<UserBetDetail>, ApiError> {
        let wagers = self.store.wagers_for_user(user_id).await?;

        let mut details = Vec::with_capacity(wagers.len());
        for wager in wagers {
            let Some(event) = self.store.get_event(wager.bet_event_id).await? else {
                continue;
            };
            let chosen_option_text = if wager.chosen_option == 1 {
                event.option1.clone()
            } else {
                event.option2.clone()
            };
            details.push(UserBetDetail {
                bet_id: wager.id,
                event_id: event.id,
                event_title: event.title,
                chosen_option: wager.chosen_option,
                chosen_option_text,
                amount: wager.amount,
                is_finished: event.is_finished,
                winning_option: event.winning_option,
                is_winner: event.is_finished
                    && event.winning_option == Some(wager.chosen_option),
                created_at: wager.created_at,
            });
        }
        Ok(details)
    }
}
