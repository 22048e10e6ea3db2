/*!
 * SQLite handle for the song library.
 *
 * One connection is shared behind a mutex; async callers hop onto tokio's
 * blocking pool through `execute_async` so queries never stall the runtime.
 */

use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::LibraryError;

use super::schema;

/// Library file name inside the application data directory
const LIBRARY_FILE: &str = "library.db";

/// Application directory under the user's data directory
const APP_DIR: &str = "bilyric";

/// Marker path reported for in-memory libraries
const IN_MEMORY: &str = ":memory:";

/// Shared, schema-initialized SQLite connection
#[derive(Clone)]
pub struct DatabaseConnection {
    // @field: Location on disk, or ":memory:"
    location: PathBuf,
    // @field: The one connection all library calls go through
    inner: Arc<Mutex<Connection>>,
}

impl fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl DatabaseConnection {
    /// Open the library in the user data directory
    pub fn new_default() -> Result<Self, LibraryError> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the library file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let location = path.as_ref().to_path_buf();
        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening song library at {:?}", location);
        Self::wrap(Connection::open(&location)?, location)
    }

    /// Throwaway library that lives as long as the handle
    pub fn new_in_memory() -> Result<Self, LibraryError> {
        debug!("Opening in-memory song library");
        Self::wrap(Connection::open_in_memory()?, PathBuf::from(IN_MEMORY))
    }

    fn wrap(conn: Connection, location: PathBuf) -> Result<Self, LibraryError> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            location,
            inner: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/bilyric/library.db`
    pub fn default_database_path() -> Result<PathBuf, LibraryError> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .ok_or_else(|| {
                LibraryError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no user data directory on this system",
                ))
            })?;

        Ok(data_dir.join(APP_DIR).join(LIBRARY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.location
    }

    pub fn is_in_memory(&self) -> bool {
        self.location.as_os_str() == IN_MEMORY
    }

    /// Run `op` on the calling thread while holding the connection
    pub fn execute<F, T>(&self, op: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Connection) -> Result<T, LibraryError>,
    {
        op(&self.inner.lock())
    }

    /// Run `op` on the blocking pool
    pub async fn execute_async<F, T>(&self, op: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Connection) -> Result<T, LibraryError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || op(&inner.lock()))
            .await
            .map_err(|e| LibraryError::Task(e.to_string()))?
    }

    /// Song counts and file size
    pub fn stats(&self) -> Result<DatabaseStats, LibraryError> {
        let (song_count, favorite_count) = self.execute(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(favorite), 0) FROM songs",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )?)
        })?;

        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.location).map(|m| m.len()).unwrap_or(0)
        };

        Ok(DatabaseStats {
            song_count,
            favorite_count,
            file_size_bytes,
        })
    }
}

/// Snapshot of the library size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub song_count: i64,
    pub favorite_count: i64,
    pub file_size_bytes: u64,
}

impl fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} songs ({} favorites), {} KB on disk",
            self.song_count,
            self.favorite_count,
            self.file_size_bytes / 1024
        )
    }
}
