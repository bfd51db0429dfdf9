//! Pari-mutuel payout computation
//!
//! Pure math, no I/O: every winner receives `floor(total_pool * stake /
//! winning_total)`. Truncation is toward zero and the fractional remainder
//! of a non-even split is not redistributed.

use crate::models::UserBet;

/// One winner's computed slice of the pool, before any ledger credit is
/// attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutShare {
    pub user_id: String,
    pub stake: i64,
    pub payout: i64,
}

/// Total staked on the winning option.
pub fn winning_total(winners: &[UserBet]) -> i64 {
    winners.iter().map(|w| w.amount).sum()
}

/// Proportional distribution of `total_pool` across the winning wagers.
/// Empty when nobody backed the winning option (the no-winners case: the
/// pool is retained by no one).
pub fn proportional_payouts(total_pool: i64, winners: &[UserBet]) -> Vec<PayoutShare> {
    let winning_total = winning_total(winners);
    if winning_total == 0 {
        return Vec::new();
    }

    winners
        .iter()
        .map(|w| {
            // 128-bit intermediate so total_pool * stake cannot overflow.
            let payout = (total_pool as i128 * w.amount as i128 / winning_total as i128) as i64;
            PayoutShare {
                user_id: w.user_id.clone(),
                stake: w.amount,
                payout,
            }
        })
        .collect()
}
