// Record store implementation using SQLite

use crate::models::{ToDo, now_ms};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CURRENT_VERSION: u32 = 1;

/// Durable store for the to-do collection, backed by SQLite.
///
/// The store holds an exclusive advisory lock on its directory for its whole
/// lifetime: one writer at a time, matching the single-threaded consumer it
/// serves.
pub struct Store {
    base_path: PathBuf,
    db: Connection,
    // Held open so the fs2 lock stays alive until the store is dropped
    _lock: fs::File,
}

impl Store {
    /// Open or create a store at the given path
    ///
    /// The store will be created in a `.todostore` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(".todostore");

        // Create directory if it doesn't exist
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        // Take the single-writer lock before touching the database
        let lock_path = base_path.join(".lock");
        let lock = fs::File::create(&lock_path).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .context("Store is already open in another process")?;

        // Open SQLite database
        let db_path = base_path.join("todos.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let store = Self {
            base_path,
            db,
            _lock: lock,
        };

        // Initialize schema
        store.create_schema()?;

        // Write/check version
        store.write_version()?;

        info!(path = ?store.base_path, "Store opened");
        Ok(store)
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create database schema
    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                is_complete INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
            "#,
        )?;

        Ok(())
    }

    /// Write version file
    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    /// Create a new record and commit it immediately
    ///
    /// The description must be non-empty after trimming; callers (the session)
    /// are expected to have trimmed already, so a violation here is a contract
    /// error rather than user input to be silently dropped.
    pub fn create(&mut self, description: &str) -> Result<ToDo> {
        if description.trim().is_empty() {
            return Err(eyre!("To-do description cannot be empty or whitespace-only"));
        }
        if description != description.trim() {
            return Err(eyre!("To-do description must be trimmed before insertion"));
        }

        let todo = ToDo::new(description);

        self.db
            .execute(
                "INSERT INTO todos (id, description, is_complete, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    &todo.id,
                    &todo.description,
                    todo.is_complete as i64,
                    todo.created_at,
                    todo.updated_at
                ],
            )
            .context("Failed to insert to-do record")?;

        debug!(id = %todo.id, "Created to-do record");
        Ok(todo)
    }

    /// Load every committed record in insertion order
    ///
    /// SQLite's rowid increases monotonically for this append-only table, so
    /// ordering by it reproduces the order records were added.
    pub fn load_all(&self) -> Result<Vec<ToDo>> {
        let mut stmt = self
            .db
            .prepare(
                "SELECT id, description, is_complete, created_at, updated_at
                 FROM todos ORDER BY rowid",
            )
            .context("Failed to prepare load query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ToDo {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    is_complete: row.get::<_, i64>(2)? != 0,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .context("Failed to load to-do records")?;

        let mut todos = Vec::new();
        for row in rows {
            todos.push(row.context("Failed to read to-do row")?);
        }

        debug!(count = todos.len(), "Loaded to-do records");
        Ok(todos)
    }

    /// Flush pending in-memory mutations to durable storage
    ///
    /// Writes the completion flag of each given record inside a single
    /// transaction: either every record lands or the error propagates with the
    /// database unchanged. Unknown ids are rejected rather than ignored.
    pub fn commit(&mut self, records: &[ToDo]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = now_ms();
        let tx = self.db.transaction()?;

        for todo in records {
            let changed = tx
                .execute(
                    "UPDATE todos SET is_complete = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![todo.is_complete as i64, now, &todo.id],
                )
                .context("Failed to update to-do record")?;

            if changed == 0 {
                return Err(eyre!("Cannot commit unknown to-do record: {}", todo.id));
            }
        }

        tx.commit().context("Failed to commit to-do updates")?;

        info!(count = records.len(), "Committed pending to-do updates");
        Ok(())
    }
}
