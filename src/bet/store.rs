//! Bet Store
//!
//! SQLite state for betting events and individual wagers. Pool totals are
//! updated with relative increments inside the same transaction that inserts
//! the wager, so concurrent bets on one event cannot lose updates; the
//! UNIQUE(user_id, bet_event_id) constraint closes the check-then-insert
//! race on duplicate wagers.

use crate::models::{BetEvent, UserBet};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of the transactional wager insert.
#[derive(Debug)]
pub enum WagerInsert {
    Placed(UserBet),
    /// The event stopped accepting wagers between the caller's check and the
    /// insert (finalized or cancelled concurrently).
    EventNotOpen,
    /// UNIQUE(user_id, bet_event_id) fired.
    Duplicate,
}

#[derive(Clone)]
pub struct BetStore {
    conn: Arc<Mutex<Connection>>,
}

impl BetStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open bet db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bet_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                option1 TEXT NOT NULL,
                option2 TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_finished INTEGER NOT NULL DEFAULT 0,
                winning_option INTEGER,
                total_bet_amount INTEGER NOT NULL DEFAULT 0,
                option1_bet_amount INTEGER NOT NULL DEFAULT 0,
                option2_bet_amount INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_bets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                bet_event_id INTEGER NOT NULL,
                chosen_option INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, bet_event_id),
                FOREIGN KEY (bet_event_id) REFERENCES bet_events(id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_bets_event ON user_bets(bet_event_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_bets_user ON user_bets(user_id)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn create_event(
        &self,
        title: &str,
        description: &str,
        option1: &str,
        option2: &str,
    ) -> Result<BetEvent> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO bet_events (title, description, option1, option2, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![title, description, option1, option2, now],
        )
        .context("insert bet event")?;
        let id = conn.last_insert_rowid();

        Ok(BetEvent {
            id,
            title: title.to_string(),
            description: description.to_string(),
            option1: option1.to_string(),
            option2: option2.to_string(),
            is_active: true,
            is_finished: false,
            winning_option: None,
            total_bet_amount: 0,
            option1_bet_amount: 0,
            option2_bet_amount: 0,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Option<BetEvent>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "{EVENT_COLUMNS} FROM bet_events WHERE id = ?1"
        ))?;
        let event = stmt
            .query_row(params![event_id], row_to_event)
            .optional()?;
        Ok(event)
    }

    pub async fn active_events(&self) -> Result<Vec<BetEvent>> {
        self.query_events(&format!(
            "{EVENT_COLUMNS} FROM bet_events
             WHERE is_active = 1 AND is_finished = 0 ORDER BY id ASC"
        ))
        .await
    }

    pub async fn finished_events(&self) -> Result<Vec<BetEvent>> {
        self.query_events(&format!(
            "{EVENT_COLUMNS} FROM bet_events WHERE is_finished = 1 ORDER BY id ASC"
        ))
        .await
    }

    async fn query_events(&self, sql: &str) -> Result<Vec<BetEvent>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map([], row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Insert a wager and bump the event pools in one transaction. The pool
    /// update is a relative increment guarded by the open state, so a
    /// concurrently closed event rolls the whole thing back.
    pub async fn insert_wager(
        &self,
        user_id: &str,
        event_id: i64,
        chosen_option: i64,
        amount: i64,
    ) -> Result<WagerInsert> {
        let now = Utc::now().to_rfc3339();
        let option_column = if chosen_option == 1 {
            "option1_bet_amount"
        } else {
            "option2_bet_amount"
        };

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            &format!(
                "UPDATE bet_events SET
                    total_bet_amount = total_bet_amount + ?2,
                    {option_column} = {option_column} + ?2,
                    updated_at = ?3
                 WHERE id = ?1 AND is_active = 1 AND is_finished = 0"
            ),
            params![event_id, amount, now],
        )?;
        if updated == 0 {
            return Ok(WagerInsert::EventNotOpen);
        }

        let inserted = tx.execute(
            "INSERT INTO user_bets (user_id, bet_event_id, chosen_option, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, event_id, chosen_option, amount, now],
        );

        match inserted {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                tx.commit().context("commit wager")?;
                Ok(WagerInsert::Placed(UserBet {
                    id,
                    user_id: user_id.to_string(),
                    bet_event_id: event_id,
                    chosen_option,
                    amount,
                    created_at: now,
                }))
            }
            Err(err) if is_unique_violation(&err) => Ok(WagerInsert::Duplicate),
            Err(err) => Err(err).context("insert wager"),
        }
    }

    pub async fn find_wager(&self, user_id: &str, event_id: i64) -> Result<Option<UserBet>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, bet_event_id, chosen_option, amount, created_at
             FROM user_bets WHERE user_id = ?1 AND bet_event_id = ?2",
        )?;
        let bet = stmt
            .query_row(params![user_id, event_id], row_to_bet)
            .optional()?;
        Ok(bet)
    }

    pub async fn wagers_for_event(&self, event_id: i64) -> Result<Vec<UserBet>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, bet_event_id, chosen_option, amount, created_at
             FROM user_bets WHERE bet_event_id = ?1 ORDER BY id ASC",
        )?;
        let bets = collect_bets(stmt.query_map(params![event_id], row_to_bet)?);
        bets
    }

    pub async fn wagers_for_event_option(
        &self,
        event_id: i64,
        chosen_option: i64,
    ) -> Result<Vec<UserBet>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, bet_event_id, chosen_option, amount, created_at
             FROM user_bets WHERE bet_event_id = ?1 AND chosen_option = ?2 ORDER BY id ASC",
        )?;
        let bets = collect_bets(stmt.query_map(params![event_id, chosen_option], row_to_bet)?);
        bets
    }

    pub async fn wagers_for_user(&self, user_id: &str) -> Result<Vec<UserBet>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, bet_event_id, chosen_option, amount, created_at
             FROM user_bets WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let bets = collect_bets(stmt.query_map(params![user_id], row_to_bet)?);
        bets
    }

    /// Commit the Active -> Finished transition. Returns false when the
    /// event was not open anymore, so two concurrent finalize calls cannot
    /// both succeed.
    pub async fn mark_finished(&self, event_id: i64, winning_option: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE bet_events SET is_finished = 1, winning_option = ?2, updated_at = ?3
             WHERE id = ?1 AND is_active = 1 AND is_finished = 0",
            params![event_id, winning_option, Utc::now().to_rfc3339()],
        )?;
        Ok(updated == 1)
    }

    /// Commit the Active -> Cancelled transition (`is_finished` stays 0,
    /// which is how Cancelled is distinguished from Finished).
    pub async fn mark_cancelled(&self, event_id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE bet_events SET is_active = 0, updated_at = ?2
             WHERE id = ?1 AND is_active = 1 AND is_finished = 0",
            params![event_id, Utc::now().to_rfc3339()],
        )?;
        Ok(updated == 1)
    }
}

const EVENT_COLUMNS: &str = "SELECT id, title, description, option1, option2, is_active,
    is_finished, winning_option, total_bet_amount, option1_bet_amount,
    option2_bet_amount, created_at, updated_at";

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<BetEvent> {
    Ok(BetEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        option1: row.get(3)?,
        option2: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        is_finished: row.get::<_, i64>(6)? != 0,
        winning_option: row.get(7)?,
        total_bet_amount: row.get(8)?,
        option1_bet_amount: row.get(9)?,
        option2_bet_amount: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn row_to_bet(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserBet> {
    Ok(UserBet {
        id: row.get(0)?,
        user_id: row.get(1)?,
        bet_event_id: row.get(2)?,
        chosen_option: row.get(3)?,
        amount: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn collect_bets(
    rows: impl Iterator<Item = rusqlite::Result<UserBet>>,
) -> Result<Vec<UserBet>> {
    let mut bets = Vec::new();
    for row in rows {
        bets.push(row?);
    }
    Ok(bets)
}
