// Data models for todostore

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do item
///
/// Records carry a stable UUID v7 id assigned at creation; all store-level
/// mutation is keyed by that id rather than by list position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToDo {
    pub id: String,
    pub description: String,
    pub is_complete: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ToDo {
    /// Build a fresh, incomplete record. The description must already be
    /// trimmed; the store validates it before insertion.
    pub fn new(description: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::now_v7().to_string(),
            description: description.into(),
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lifecycle events at which pending in-memory mutations are flushed
/// to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// The application moved to the background.
    Background,
    /// The application is about to terminate.
    Terminate,
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checkpoint::Background => write!(f, "background"),
            Checkpoint::Terminate => write!(f, "terminate"),
        }
    }
}

/// Re-render signal returned to the presentation layer after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Row count changed; re-render the whole list.
    All,
    /// Only the row at this index changed.
    Row(usize),
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}
