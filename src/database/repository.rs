/*!
 * Repository layer for the song library.
 *
 * This module provides the SQLite implementation of `ResultStore`,
 * abstracting away the SQL details and providing type-safe access.
 */

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::LibraryError;

use super::connection::DatabaseConnection;
use super::models::SongRecord;
use super::ResultStore;

const SONG_COLUMNS: &str = "id, name, file_hash, source_language, target_language, \
     detected_language, favorite, result_json, created_at, updated_at";

/// SQLite-backed song library
#[derive(Debug, Clone)]
pub struct Library {
    /// Database connection
    db: DatabaseConnection,
}

impl Library {
    /// Create a new library with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a library with the default database location
    pub fn new_default() -> Result<Self, LibraryError> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create a library with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, LibraryError> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn song_from_row(row: &Row<'_>) -> rusqlite::Result<(SongRecord, String)> {
        let result_json: String = row.get(7)?;
        // The result is decoded after the row is read so JSON errors keep their type
        let song = SongRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            file_hash: row.get(2)?,
            source_language: row.get(3)?,
            target_language: row.get(4)?,
            detected_language: row.get(5)?,
            favorite: row.get::<_, i64>(6)? != 0,
            result: Default::default(),
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        };
        Ok((song, result_json))
    }

    fn decode((mut song, result_json): (SongRecord, String)) -> Result<SongRecord, LibraryError> {
        song.result = serde_json::from_str(&result_json)?;
        Ok(song)
    }

    fn get_song_sync(conn: &Connection, id: &str) -> Result<Option<SongRecord>, LibraryError> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS),
                [id],
                Self::song_from_row,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }
}

#[async_trait]
impl ResultStore for Library {
    async fn save(&self, song: &SongRecord) -> Result<(), LibraryError> {
        let song = song.clone();
        let result_json = serde_json::to_string(&song.result)?;

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO songs (
                        id, name, file_hash, source_language, target_language,
                        detected_language, favorite, result_json, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        song.id,
                        song.name,
                        song.file_hash,
                        song.source_language,
                        song.target_language,
                        song.detected_language,
                        song.favorite as i64,
                        result_json,
                        song.created_at,
                        song.updated_at,
                    ],
                )?;
                debug!("Saved song {} ({})", song.id, song.name);
                Ok(())
            })
            .await
    }

    async fn load(&self, id: &str) -> Result<SongRecord, LibraryError> {
        let id = id.to_string();

        self.db
            .execute_async(move |conn| {
                Self::get_song_sync(conn, &id)?.ok_or(LibraryError::NotFound(id))
            })
            .await
    }

    async fn find_by_hash(
        &self,
        file_hash: &str,
        target_language: &str,
    ) -> Result<Option<SongRecord>, LibraryError> {
        let file_hash = file_hash.to_string();
        let target_language = target_language.to_string();

        self.db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM songs WHERE file_hash = ?1 AND target_language = ?2 \
                             ORDER BY created_at DESC LIMIT 1",
                            SONG_COLUMNS
                        ),
                        params![file_hash, target_language],
                        Self::song_from_row,
                    )
                    .optional()?;

                row.map(Self::decode).transpose()
            })
            .await
    }

    async fn list(&self) -> Result<Vec<SongRecord>, LibraryError> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM songs ORDER BY favorite DESC, created_at DESC",
                    SONG_COLUMNS
                ))?;

                let rows = stmt
                    .query_map([], Self::song_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                rows.into_iter().map(Self::decode).collect()
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        let id = id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM songs WHERE id = ?1", [&id])?;
                if deleted == 0 {
                    return Err(LibraryError::NotFound(id));
                }
                Ok(())
            })
            .await
    }

    async fn set_favorite(&self, id: &str, favorite: bool) -> Result<(), LibraryError> {
        let id = id.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE songs SET favorite = ?1, updated_at = ?2 WHERE id = ?3",
                    params![favorite as i64, now, id],
                )?;
                if updated == 0 {
                    return Err(LibraryError::NotFound(id));
                }
                Ok(())
            })
            .await
    }
}
