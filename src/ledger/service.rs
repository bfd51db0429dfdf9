//! Ledger Service
//!
//! Validation and orchestration above the append-only store. Policy note:
//! `debit` does not check for sufficient funds — the ledger accepts any
//! signed entry and funds policy lives with the caller (see the bet
//! service's admission control).

use crate::error::ApiError;
use crate::ledger::store::LedgerStore;
use crate::models::BalanceOperation;
use tracing::info;

#[derive(Clone)]
pub struct LedgerService {
    store: LedgerStore,
}

impl LedgerService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Append a positive entry.
    pub async fn credit(
        &self,
        client_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<BalanceOperation, ApiError> {
        if amount <= 0 {
            return Err(ApiError::Validation(
                "Amount must be positive".to_string(),
            ));
        }

        let op = self.store.insert(client_id, amount, description).await?;
        info!(client_id, amount, "💰 Credit recorded");
        Ok(op)
    }

    /// Append a negative entry of `-amount`. No funds check here.
    pub async fn debit(
        &self,
        client_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<BalanceOperation, ApiError> {
        if amount <= 0 {
            return Err(ApiError::Validation(
                "Amount must be positive".to_string(),
            ));
        }

        let op = self.store.insert(client_id, -amount, description).await?;
        info!(client_id, amount, "💸 Debit recorded");
        Ok(op)
    }

    /// Atomically move `amount` from sender to receiver: a negative and a
    /// positive entry committed in one transaction, exact negatives of each
    /// other so no value is created or destroyed.
    pub async fn transfer(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<(BalanceOperation, BalanceOperation), ApiError> {
        if sender_id == receiver_id {
            return Err(ApiError::Validation(
                "Sender and receiver cannot be the same".to_string(),
            ));
        }
        if amount <= 0 {
            return Err(ApiError::Validation(
                "Amount must be positive".to_string(),
            ));
        }

        let sender_desc = format!("Transaction to {receiver_id}: {description}");
        let receiver_desc = format!("Transaction from {sender_id}: {description}");

        let (debit_op, credit_op) = self
            .store
            .insert_pair(
                (sender_id, -amount, &sender_desc),
                (receiver_id, amount, &receiver_desc),
            )
            .await?;

        info!(sender_id, receiver_id, amount, "🔁 Transfer committed");
        Ok((debit_op, credit_op))
    }

    /// Current balance; 0 for an account with no history.
    pub async fn balance(&self, client_id: &str) -> Result<i64, ApiError> {
        Ok(self.store.balance(client_id).await?)
    }

    /// All operations for an account in creation order.
    pub async fn operations(
        &self,
        client_id: &str,
    ) -> Result<Vec<BalanceOperation>, ApiError> {
        Ok(self.store.operations(client_id).await?)
    }

    /// Administrative correction of a committed operation.
    pub async fn correct_operation(
        &self,
        id: &str,
        amount: Option<i64>,
        description: Option<&str>,
    ) -> Result<BalanceOperation, ApiError> {
        if amount == Some(0) {
            return Err(ApiError::Validation(
                "Operation amount cannot be zero".to_string(),
            ));
        }

        self.store
            .correct(id, amount, description)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Operation {id} not found")))
    }
}
