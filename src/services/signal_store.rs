//! SQLite persistence for signals and their lifecycle.
//!
//! Every write is a single committed transaction taken under the connection
//! mutex, so concurrent creates can never share an id and a result update
//! never interleaves with another write. Reads take the same lock and see
//! only committed rows.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::services::clock::VenueClock;
use crate::types::{Signal, SignalAction, SignalPrice, SignalStatus};

/// Venue-local timestamp layout used in the `timestamp` and `result_time` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SIGNAL_COLUMNS: &str =
    "id, symbol, action, price, confidence, timestamp, status, result_price, result_time";

/// Handling of a result posted for a signal that is already WON or LOST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultPolicy {
    /// Last write wins. Logged, not prevented.
    #[default]
    Overwrite,
    /// Second transition fails with `AlreadySettled`.
    RejectSettled,
}

impl ResultPolicy {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" | "last_write_wins" => Some(Self::Overwrite),
            "reject" | "reject_settled" | "strict" => Some(Self::RejectSettled),
            _ => None,
        }
    }
}

/// Raw status counts for a set of signals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u32,
    pub won: u32,
    pub lost: u32,
}

/// SQLite store owning every signal record.
pub struct SignalStore {
    conn: Mutex<Connection>,
    clock: VenueClock,
    policy: ResultPolicy,
}

impl SignalStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P, clock: VenueClock) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            clock,
            policy: ResultPolicy::default(),
        };
        store.init_schema()?;
        info!("Signal store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory(clock: VenueClock) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            clock,
            policy: ResultPolicy::default(),
        };
        store.init_schema()?;
        debug!("In-memory signal store initialized");
        Ok(store)
    }

    /// Set the policy for results on settled signals.
    pub fn with_policy(mut self, policy: ResultPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ResultPolicy {
        self.policy
    }

    pub fn clock(&self) -> &VenueClock {
        &self.clock
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::StoreUnavailable("signal store lock poisoned".to_string()))
    }

    /// Create the `signals` table if missing. Safe to run on every start.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                action TEXT NOT NULL,
                price TEXT,
                confidence REAL,
                timestamp TEXT NOT NULL,
                status TEXT DEFAULT 'PENDING',
                result_price REAL,
                result_time TEXT
            )",
            [],
        )?;

        // Databases created before confidence was recorded lack the column.
        let has_confidence: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('signals') WHERE name = 'confidence'",
            [],
            |row| row.get(0),
        )?;
        if !has_confidence {
            conn.execute("ALTER TABLE signals ADD COLUMN confidence REAL", [])?;
            info!("Added confidence column to existing signals table");
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_signals_timestamp ON signals(timestamp)",
            [],
        )?;

        debug!("Signal schema initialized");
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Record a new PENDING signal stamped with the current venue time.
    pub fn create(
        &self,
        symbol: &str,
        action: SignalAction,
        price: &SignalPrice,
        confidence: f64,
    ) -> Result<i64> {
        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO signals (symbol, action, price, confidence, timestamp, status)
             VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING')",
            params![symbol, action.as_str(), price.display, confidence, timestamp],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!("Saved signal #{} {} {} @ {}", id, symbol, action, price);
        Ok(id)
    }

    /// Move a signal to WON or LOST and stamp `result_time`.
    pub fn update_result(
        &self,
        id: i64,
        status: SignalStatus,
        result_price: Option<f64>,
    ) -> Result<()> {
        if !status.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "cannot move signal #{} back to {}",
                id, status
            )));
        }

        let result_time = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current: Option<Option<String>> = tx
            .query_row(
                "SELECT status FROM signals WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let current = match current {
            Some(s) => s
                .as_deref()
                .and_then(SignalStatus::from_str)
                .unwrap_or(SignalStatus::Pending),
            None => return Err(AppError::NotFound(format!("Signal #{} not found", id))),
        };

        if current.is_terminal() {
            match self.policy {
                ResultPolicy::RejectSettled => return Err(AppError::AlreadySettled(id)),
                ResultPolicy::Overwrite => warn!(
                    "Signal #{} already {} - overwriting with {}",
                    id, current, status
                ),
            }
        }

        tx.execute(
            "UPDATE signals
             SET status = ?1, result_time = ?2, result_price = COALESCE(?3, result_price)
             WHERE id = ?4",
            params![status.as_str(), result_time, result_price, id],
        )?;
        tx.commit()?;

        info!("Signal #{} settled as {}", id, status);
        Ok(())
    }

    // ========== Queries ==========

    /// Fetch one signal.
    pub fn get(&self, id: i64) -> Result<Signal> {
        let conn = self.conn()?;
        let offset = self.clock.offset();

        conn.query_row(
            &format!("SELECT {} FROM signals WHERE id = ?1", SIGNAL_COLUMNS),
            params![id],
            |row| signal_from_row(row, &offset),
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Signal #{} not found", id)))
    }

    /// Signals created on a venue-local date, oldest first.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Signal>> {
        let conn = self.conn()?;
        let offset = self.clock.offset();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM signals WHERE DATE(timestamp) = ?1 ORDER BY id",
            SIGNAL_COLUMNS
        ))?;
        let signals = stmt
            .query_map(params![date.to_string()], |row| signal_from_row(row, &offset))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(signals)
    }

    /// Status counts over signals created on a venue-local date.
    pub fn status_counts(&self, date: NaiveDate) -> Result<StatusCounts> {
        let conn = self.conn()?;

        let counts = conn.query_row(
            "SELECT
                COUNT(*) as total,
                SUM(CASE WHEN status = 'WON' THEN 1 ELSE 0 END) as won,
                SUM(CASE WHEN status = 'LOST' THEN 1 ELSE 0 END) as lost
             FROM signals
             WHERE DATE(timestamp) = ?1",
            params![date.to_string()],
            counts_from_row,
        )?;

        Ok(counts)
    }

    /// Per-day status counts for every date in `[from, to]` that has signals.
    pub fn status_counts_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, StatusCounts)>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT
                DATE(timestamp) as day,
                COUNT(*) as total,
                SUM(CASE WHEN status = 'WON' THEN 1 ELSE 0 END) as won,
                SUM(CASE WHEN status = 'LOST' THEN 1 ELSE 0 END) as lost
             FROM signals
             WHERE DATE(timestamp) BETWEEN ?1 AND ?2
             GROUP BY day
             ORDER BY day",
        )?;

        let rows = stmt
            .query_map(params![from.to_string(), to.to_string()], |row| {
                let day: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                let total: i64 = row.get(1)?;
                let won: Option<i64> = row.get(2)?;
                let lost: Option<i64> = row.get(3)?;
                Ok((
                    date,
                    StatusCounts {
                        total: total as u32,
                        won: won.unwrap_or(0) as u32,
                        lost: lost.unwrap_or(0) as u32,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Total number of stored signals.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn counts_from_row(row: &Row<'_>) -> rusqlite::Result<StatusCounts> {
    let total: i64 = row.get(0)?;
    // SUM over zero rows is NULL.
    let won: Option<i64> = row.get(1)?;
    let lost: Option<i64> = row.get(2)?;

    Ok(StatusCounts {
        total: total as u32,
        won: won.unwrap_or(0) as u32,
        lost: lost.unwrap_or(0) as u32,
    })
}

fn signal_from_row(row: &Row<'_>, offset: &FixedOffset) -> rusqlite::Result<Signal> {
    let action_str: String = row.get(2)?;
    let action = SignalAction::from_str(&action_str)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(2, "action".to_string(), Type::Text))?;

    let status_str: Option<String> = row.get(6)?;
    let status = match status_str {
        Some(s) => SignalStatus::from_str(&s).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(6, "status".to_string(), Type::Text)
        })?,
        None => SignalStatus::Pending,
    };

    let created: String = row.get(5)?;
    let result_time: Option<String> = row.get(8)?;

    Ok(Signal {
        id: row.get(0)?,
        symbol: row.get(1)?,
        action,
        price: price_from_value(row.get(3)?),
        confidence: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
        created_at: parse_timestamp(&created, offset)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        status,
        result_price: row.get(7)?,
        result_time: result_time
            .map(|t| parse_timestamp(&t, offset))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
    })
}

/// The price column holds text, but older rows may carry REAL values.
fn price_from_value(value: Value) -> SignalPrice {
    match value {
        Value::Text(s) => SignalPrice::from_text(s),
        Value::Real(v) => SignalPrice::from_value(v),
        Value::Integer(v) => SignalPrice::from_value(v as f64),
        Value::Null | Value::Blob(_) => SignalPrice::default(),
    }
}

/// Interpret a stored venue-local timestamp.
pub fn parse_timestamp(
    s: &str,
    offset: &FixedOffset,
) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    let local = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)?;
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    Ok(DateTime::from_naive_utc_and_offset(utc, *offset))
}
