//! SQLite schema definition
//!
//! Every statement is idempotent so the batch can run on every startup.

pub const SCHEMA: &str = r#"
-- One row per recording attempt; rows are never updated, only inserted by
-- the record pipeline and deleted by a date-scoped reset.
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,                   -- UUID
    captured_at TEXT NOT NULL,             -- RFC 3339, UTC
    category_name TEXT,                    -- resolved display name ('' permitted)
    confidence REAL,                       -- 0.0..=1.0, 0.0 when status FAILED
    status TEXT NOT NULL,                  -- 'OK' | 'FAILED'
    agent_version TEXT,                    -- classifier model id
    screenshot_hash TEXT,                  -- sha-256 hex of the resized image
    detected_apps TEXT,                    -- JSON array of strings
    detected_keywords TEXT,                -- JSON array of strings
    notes TEXT,                            -- rationale, resolution, display count
    created_at TEXT NOT NULL               -- RFC 3339, UTC
);

CREATE INDEX IF NOT EXISTS idx_events_captured_at ON events(captured_at);
"#;
