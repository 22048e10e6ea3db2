/*!
 * Song library tables and their versioning.
 *
 * A single `songs` table holds one row per processed (audio, target language)
 * pair. The version row in `schema_version` guards against opening a library
 * written by a newer build.
 */

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};
use std::cmp::Ordering;

use crate::errors::LibraryError;

/// Layout version written by this build
pub const SCHEMA_VERSION: i32 = 1;

const VERSION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

const SONGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        file_hash TEXT NOT NULL,
        source_language TEXT NOT NULL,
        target_language TEXT NOT NULL,
        detected_language TEXT NOT NULL,
        favorite INTEGER NOT NULL DEFAULT 0,
        result_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_songs_hash_target ON songs(file_hash, target_language);
    CREATE INDEX IF NOT EXISTS idx_songs_favorite ON songs(favorite);
"#;

/// Bring a freshly opened connection up to `SCHEMA_VERSION`
pub fn initialize_schema(conn: &Connection) -> Result<(), LibraryError> {
    let found = stored_version(conn)?;

    match found.cmp(&SCHEMA_VERSION) {
        Ordering::Equal => {
            debug!("Song library already at schema v{}", found);
            Ok(())
        }
        Ordering::Greater => Err(LibraryError::Migration(format!(
            "library was written by a newer version (schema v{}, supported v{})",
            found, SCHEMA_VERSION
        ))),
        Ordering::Less if found == 0 => {
            info!("Creating song library tables (schema v{})", SCHEMA_VERSION);
            create_tables(conn)?;
            write_version(conn, SCHEMA_VERSION)
        }
        // v1 is the first released layout, so any other older number is corrupt
        Ordering::Less => Err(LibraryError::Migration(format!(
            "unrecognised schema version v{}",
            found
        ))),
    }
}

/// 0 when the library has never been initialized
fn stored_version(conn: &Connection) -> Result<i32, LibraryError> {
    let has_table: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if has_table == 0 {
        return Ok(0);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| row.get(0))
        .optional()?;
    Ok(version.unwrap_or(0))
}

fn write_version(conn: &Connection, version: i32) -> Result<(), LibraryError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<(), LibraryError> {
    // In-memory databases answer "memory" here and keep going
    conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get::<_, String>(0))?;

    conn.execute_batch(VERSION_TABLE)?;
    conn.execute_batch(SONGS_TABLE)?;
    Ok(())
}
