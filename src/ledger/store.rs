//! Ledger Store
//!
//! Append-only SQLite table of signed balance operations. Rows are never
//! deleted; an account's balance is always derived by summation, so there is
//! no cached-balance column to drift from the history.

use crate::models::BalanceOperation;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct LedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open ledger db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS balance_operations (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                amount INTEGER NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_balance_operations_client
             ON balance_operations(client_id)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Append one signed operation.
    pub async fn insert(
        &self,
        client_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<BalanceOperation> {
        let op = new_operation(client_id, amount, description);
        let conn = self.conn.lock().await;
        insert_row(&conn, &op)?;
        Ok(op)
    }

    /// Append two operations in a single transaction: either both rows
    /// persist or neither does. This is the atomicity backing `transfer`.
    pub async fn insert_pair(
        &self,
        first: (&str, i64, &str),
        second: (&str, i64, &str),
    ) -> Result<(BalanceOperation, BalanceOperation)> {
        let op_a = new_operation(first.0, first.1, first.2);
        let op_b = new_operation(second.0, second.1, second.2);

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        insert_row(&tx, &op_a)?;
        insert_row(&tx, &op_b)?;
        tx.commit().context("commit paired operations")?;

        Ok((op_a, op_b))
    }

    /// Sum of all operation amounts for an account; 0 with no history.
    pub async fn balance(&self, client_id: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT COALESCE(SUM(amount), 0) FROM balance_operations WHERE client_id = ?1",
        )?;
        let balance: i64 = stmt.query_row(params![client_id], |row| row.get(0))?;
        Ok(balance)
    }

    /// All operations for an account in creation order.
    pub async fn operations(&self, client_id: &str) -> Result<Vec<BalanceOperation>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, client_id, amount, description, created_at, updated_at
             FROM balance_operations WHERE client_id = ?1 ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![client_id], row_to_operation)?;
        let mut ops = Vec::new();
        for row in rows {
            ops.push(row?);
        }
        Ok(ops)
    }

    /// Administrative correction of a committed row. Not used by any normal
    /// flow; every other field stays immutable.
    pub async fn correct(
        &self,
        id: &str,
        amount: Option<i64>,
        description: Option<&str>,
    ) -> Result<Option<BalanceOperation>> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE balance_operations SET
                amount = COALESCE(?2, amount),
                description = COALESCE(?3, description),
                updated_at = ?4
             WHERE id = ?1",
            params![id, amount, description, Utc::now().to_rfc3339()],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let mut stmt = conn.prepare_cached(
            "SELECT id, client_id, amount, description, created_at, updated_at
             FROM balance_operations WHERE id = ?1",
        )?;
        let op = stmt
            .query_row(params![id], row_to_operation)
            .optional()?;
        Ok(op)
    }
}

fn new_operation(client_id: &str, amount: i64, description: &str) -> BalanceOperation {
    let now = Utc::now().to_rfc3339();
    BalanceOperation {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        amount,
        description: description.to_string(),
        created_at: now.clone(),
        updated_at: now,
    }
}

fn insert_row(conn: &Connection, op: &BalanceOperation) -> Result<()> {
    conn.execute(
        "INSERT INTO balance_operations (id, client_id, amount, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            op.id,
            op.client_id,
            op.amount,
            op.description,
            op.created_at,
            op.updated_at,
        ],
    )
    .context("insert balance operation")?;
    Ok(())
}

fn row_to_operation(row: &rusqlite::Row<'_>) -> rusqlite::Result<BalanceOperation> {
    Ok(BalanceOperation {
        id: row.get(0)?,
        client_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_account_has_zero_balance() {
        let store = LedgerStore::new(":memory:").expect("Failed to create database");
        assert_eq!(store.balance("ghost").await.unwrap(), 0);
        assert!(store.operations("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_operations() {
        let store = LedgerStore::new(":memory:").expect("Failed to create database");
        store.insert("alice", 100, "seed").await.unwrap();
        store.insert("alice", -30, "spend").await.unwrap();
        store.insert("bob", 50, "seed").await.unwrap();

        assert_eq!(store.balance("alice").await.unwrap(), 70);
        assert_eq!(store.balance("bob").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_operations_keep_creation_order() {
        let store = LedgerStore::new(":memory:").expect("Failed to create database");
        for i in 1..=5 {
            store.insert("alice", i, "op").await.unwrap();
        }

        let ops = store.operations("alice").await.unwrap();
        let amounts: Vec<i64> = ops.iter().map(|o| o.amount).collect();
        assert_eq!(amounts, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_insert_pair_writes_both_rows() {
        let store = LedgerStore::new(":memory:").expect("Failed to create database");
        let (debit, credit) = store
            .insert_pair(("alice", -40, "to bob"), ("bob", 40, "from alice"))
            .await
            .unwrap();

        assert_eq!(debit.amount, -40);
        assert_eq!(credit.amount, 40);
        assert_eq!(store.balance("alice").await.unwrap(), -40);
        assert_eq!(store.balance("bob").await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_correct_updates_amount_and_description() {
        let store = LedgerStore::new(":memory:").expect("Failed to create database");
        let op = store.insert("alice", 100, "typo").await.unwrap();

        let fixed = store
            .correct(&op.id, Some(10), Some("admin fix"))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(fixed.amount, 10);
        assert_eq!(fixed.description, "admin fix");
        assert_eq!(store.balance("alice").await.unwrap(), 10);

        assert!(store
            .correct("missing-id", Some(1), None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_on_disk_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let path = path.to_string_lossy();

        {
            let store = LedgerStore::new(&path).unwrap();
            store.insert("alice", 77, "seed").await.unwrap();
        }

        let reopened = LedgerStore::new(&path).unwrap();
        assert_eq!(reopened.balance("alice").await.unwrap(), 77);
    }
}
