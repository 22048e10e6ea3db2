/*!
 * Database module for the song library.
 *
 * This module provides SQLite-based persistence for processed songs so a
 * result can be replayed later without re-running the services:
 * - `ResultStore`: the persistence port the controller talks to
 * - `Library`: its SQLite implementation
 */

use async_trait::async_trait;

use crate::errors::LibraryError;

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::SongRecord;
pub use repository::Library;

/// Storage for processed songs
///
/// Results are stored as opaque JSON; nothing in the pipeline reads them back
/// except through this trait.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert or replace a song
    async fn save(&self, song: &SongRecord) -> Result<(), LibraryError>;

    /// Get a song by id
    async fn load(&self, id: &str) -> Result<SongRecord, LibraryError>;

    /// Most recent song processed from the same audio into the same language
    async fn find_by_hash(
        &self,
        file_hash: &str,
        target_language: &str,
    ) -> Result<Option<SongRecord>, LibraryError>;

    /// All songs, favorites first, newest first
    async fn list(&self) -> Result<Vec<SongRecord>, LibraryError>;

    /// Remove a song
    async fn delete(&self, id: &str) -> Result<(), LibraryError>;

    /// Mark or unmark a song as favorite
    async fn set_favorite(&self, id: &str, favorite: bool) -> Result<(), LibraryError>;
}
