//! Append-only event log backed by SQLite
//!
//! All timestamps are persisted as fixed-width RFC 3339 UTC text (microsecond
//! precision, `Z` suffix), so TEXT comparison in SQL is chronological and the
//! date-range queries can use plain `>=`/`<` bounds.

mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, ToSql};
use std::fmt;
use std::path::Path;

pub use schema::SCHEMA;

/// Immutable record of one capture attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub category_name: String,
    pub confidence: f64,
    pub status: EventStatus,
    pub agent_version: String,
    pub screenshot_hash: String,
    pub detected_apps: Vec<String>,
    pub detected_keywords: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// FAILED means classification did not succeed; the event is persisted anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Ok,
    Failed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Ok => "OK",
            EventStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for EventStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for EventStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "OK" => Ok(EventStatus::Ok),
            "FAILED" => Ok(EventStatus::Failed),
            other => Err(FromSqlError::Other(Box::from(format!(
                "unknown event status: {other}"
            )))),
        }
    }
}

pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database dir {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("open database {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn insert_event(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (
                id, captured_at, category_name, confidence, status, agent_version,
                screenshot_hash, detected_apps, detected_keywords, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                event.id,
                format_utc(&event.captured_at),
                event.category_name,
                event.confidence,
                event.status,
                event.agent_version,
                event.screenshot_hash,
                serde_json::to_string(&event.detected_apps)?,
                serde_json::to_string(&event.detected_keywords)?,
                event.notes,
                format_utc(&event.created_at),
            ],
        )?;
        Ok(())
    }

    /// Events whose capture time falls in the given local calendar day,
    /// ascending by capture time
    pub fn list_events_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        let (start, end) = day_range_utc(date)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, captured_at, category_name, confidence, status, agent_version,
                    screenshot_hash, detected_apps, detected_keywords, notes, created_at
             FROM events WHERE captured_at >= ? AND captured_at < ?
             ORDER BY captured_at ASC",
        )?;

        let rows = stmt.query_map(params![format_utc(&start), format_utc(&end)], |row| {
            Ok(Event {
                id: row.get(0)?,
                captured_at: parse_utc(1, &row.get::<_, String>(1)?)?,
                category_name: row.get(2)?,
                confidence: row.get(3)?,
                status: row.get(4)?,
                agent_version: row.get(5)?,
                screenshot_hash: row.get(6)?,
                detected_apps: parse_list(7, &row.get::<_, String>(7)?)?,
                detected_keywords: parse_list(8, &row.get::<_, String>(8)?)?,
                notes: row.get(9)?,
                created_at: parse_utc(10, &row.get::<_, String>(10)?)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a local calendar day's events; returns the number removed
    pub fn delete_events_by_date(&self, date: NaiveDate) -> Result<usize> {
        let (start, end) = day_range_utc(date)?;

        let deleted = self.conn.execute(
            "DELETE FROM events WHERE captured_at >= ? AND captured_at < ?",
            params![format_utc(&start), format_utc(&end)],
        )?;
        Ok(deleted)
    }
}

/// UTC instant bounds of a local calendar day: [local 00:00, +24h).
/// The same conversion backs both list and delete, so a day always means the
/// same event set.
fn day_range_utc(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start_local = date
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("no local midnight for {date}"))?;
    let start = start_local.with_timezone(&Utc);
    Ok((start, start + Duration::days(1)))
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_utc(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_list(idx: usize, text: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
