//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the gem-tenders database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track traversal runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    direction TEXT NOT NULL,
    status TEXT NOT NULL,
    expected_records INTEGER NOT NULL DEFAULT 0,
    total_pages INTEGER NOT NULL DEFAULT 0,
    scraped_records INTEGER NOT NULL DEFAULT 0,
    termination TEXT
);

-- Records harvested by each run, in traversal order
CREATE TABLE IF NOT EXISTS tenders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    page INTEGER NOT NULL,
    bid_number TEXT NOT NULL,
    detail_url TEXT NOT NULL,
    items TEXT NOT NULL,
    quantity TEXT NOT NULL,
    department TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tenders_run ON tenders(run_id);
CREATE INDEX IF NOT EXISTS idx_tenders_bid_number ON tenders(bid_number);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
