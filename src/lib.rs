// ToDoStore - durable to-do records with a single-screen session layer

pub mod models;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use models::{Checkpoint, Refresh, ToDo, now_ms};
pub use session::{ListSession, RowView};
pub use store::Store;
