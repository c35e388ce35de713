// In-memory list session over the record store

use crate::models::{Checkpoint, Refresh, ToDo};
use crate::store::Store;
use eyre::{Result, eyre};
use std::collections::HashSet;
use tracing::{debug, info};

/// One row as the presentation layer should render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowView<'a> {
    pub text: &'a str,
    pub checked: bool,
}

/// Ordered view of the to-do list for the active screen.
///
/// The session owns its store (passed in at construction) and translates the
/// two user intents, add and toggle, into store calls plus a [`Refresh`]
/// signal for the caller. Adds are committed immediately; toggles are batched
/// in memory and flushed at lifecycle checkpoints. A toggle that never reaches
/// a checkpoint is lost on process death, which matches the durability the
/// screen promises.
pub struct ListSession {
    store: Store,
    todos: Vec<ToDo>,
    dirty: HashSet<String>,
}

impl ListSession {
    /// Load all previously committed records and start a session over them.
    pub fn open(store: Store) -> Result<Self> {
        let todos = store.load_all()?;
        info!(count = todos.len(), "List session ready");

        Ok(Self {
            store,
            todos,
            dirty: HashSet::new(),
        })
    }

    /// Handle an add intent carrying raw user input.
    ///
    /// Returns `Ok(None)` when the trimmed input is empty: the intent is
    /// discarded with no state change, no commit, and no re-render. Otherwise
    /// the new record is created, durably committed, appended to the session,
    /// and a full re-render is signalled (the row count changed).
    pub fn add(&mut self, raw: &str) -> Result<Option<Refresh>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            debug!("Discarding empty add intent");
            return Ok(None);
        }

        let todo = self.store.create(trimmed)?;
        self.todos.push(todo);

        Ok(Some(Refresh::All))
    }

    /// Handle a toggle intent for the row at `index`.
    ///
    /// Flips the completion flag in place and signals a single-row re-render.
    /// The flip is NOT committed here; it stays pending until the next
    /// [`checkpoint`](Self::checkpoint). Indices come from currently rendered
    /// rows, so an out-of-range index is a caller bug and is reported as an
    /// error instead of panicking.
    pub fn toggle(&mut self, index: usize) -> Result<Refresh> {
        let len = self.todos.len();
        let todo = self
            .todos
            .get_mut(index)
            .ok_or_else(|| eyre!("Toggle index {} out of range (len {})", index, len))?;

        todo.is_complete = !todo.is_complete;
        self.dirty.insert(todo.id.clone());

        debug!(index, id = %todo.id, is_complete = todo.is_complete, "Toggled to-do");
        Ok(Refresh::Row(index))
    }

    /// Flush pending toggles at a lifecycle checkpoint.
    ///
    /// Called when the application backgrounds or is about to terminate. Does
    /// nothing when no toggles are pending.
    pub fn checkpoint(&mut self, event: Checkpoint) -> Result<()> {
        if self.dirty.is_empty() {
            debug!(%event, "Checkpoint with no pending changes");
            return Ok(());
        }

        let pending: Vec<ToDo> = self
            .todos
            .iter()
            .filter(|t| self.dirty.contains(&t.id))
            .cloned()
            .collect();

        self.store.commit(&pending)?;
        self.dirty.clear();

        info!(%event, count = pending.len(), "Checkpoint flushed pending toggles");
        Ok(())
    }

    /// Number of rows on screen.
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Rendering contract: what the presentation layer needs for one row.
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.todos.get(index).map(|t| RowView {
            text: &t.description,
            checked: t.is_complete,
        })
    }

    /// The loaded records, in screen order.
    pub fn todos(&self) -> &[ToDo] {
        &self.todos
    }

    /// Give the store back, e.g. to reopen a fresh session.
    pub fn into_store(self) -> Store {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session_in(temp: &TempDir) -> ListSession {
        let store = Store::open(temp.path()).unwrap();
        ListSession::open(store).unwrap()
    }

    #[test]
    fn test_add_trims_and_creates() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);

        let refresh = session.add("  Buy milk \n").unwrap();
        assert_eq!(refresh, Some(Refresh::All));
        assert_eq!(session.len(), 1);
        assert_eq!(session.row(0).unwrap().text, "Buy milk");
        assert!(!session.row(0).unwrap().checked);
    }

    #[test]
    fn test_add_rejects_whitespace_only_input() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);

        assert_eq!(session.add("").unwrap(), None);
        assert_eq!(session.add("   ").unwrap(), None);
        assert_eq!(session.add(" \n\t ").unwrap(), None);
        assert_eq!(session.len(), 0);

        // Nothing was committed either
        let store = session.into_store();
        assert_eq!(store.load_all().unwrap().len(), 0);
    }

    #[test]
    fn test_add_appends_in_order() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);

        session.add("first").unwrap();
        session.add("second").unwrap();
        session.add("third").unwrap();

        let texts: Vec<&str> = (0..session.len())
            .map(|i| session.row(i).unwrap().text)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn test_toggle_flips_and_pairs_back() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();

        assert_eq!(session.toggle(0).unwrap(), Refresh::Row(0));
        assert!(session.row(0).unwrap().checked);

        // Toggling twice restores the original value
        session.toggle(0).unwrap();
        assert!(!session.row(0).unwrap().checked);
    }

    #[test]
    fn test_toggle_out_of_range_is_error() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();

        assert!(session.toggle(1).is_err());
        assert!(session.toggle(usize::MAX).is_err());
    }

    #[test]
    fn test_toggle_is_not_durable_without_checkpoint() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();
        session.toggle(0).unwrap();

        // Simulated process kill: drop without a checkpoint
        drop(session);

        let store = Store::open(temp.path()).unwrap();
        let todos = store.load_all().unwrap();
        assert!(!todos[0].is_complete, "untoggled flag should not survive");
    }

    #[test]
    fn test_checkpoint_makes_toggle_durable() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();
        session.toggle(0).unwrap();

        session.checkpoint(Checkpoint::Background).unwrap();
        drop(session);

        let store = Store::open(temp.path()).unwrap();
        let todos = store.load_all().unwrap();
        assert!(todos[0].is_complete);
    }

    #[test]
    fn test_checkpoint_without_changes_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();

        session.checkpoint(Checkpoint::Terminate).unwrap();
        session.checkpoint(Checkpoint::Background).unwrap();
    }

    #[test]
    fn test_checkpoint_clears_pending_set() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);
        session.add("Buy milk").unwrap();

        session.toggle(0).unwrap();
        session.checkpoint(Checkpoint::Background).unwrap();

        // A second checkpoint with nothing new pending must not rewrite rows
        session.checkpoint(Checkpoint::Terminate).unwrap();

        let store = session.into_store();
        assert!(store.load_all().unwrap()[0].is_complete);
    }

    #[test]
    fn test_session_reload_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);

        session.add("Buy milk").unwrap();
        session.add("Walk the dog").unwrap();
        session.toggle(1).unwrap();
        session.checkpoint(Checkpoint::Terminate).unwrap();

        let store = session.into_store();
        let session = ListSession::open(store).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.row(0).unwrap().text, "Buy milk");
        assert!(!session.row(0).unwrap().checked);
        assert_eq!(session.row(1).unwrap().text, "Walk the dog");
        assert!(session.row(1).unwrap().checked);
    }

    // Full scenario: add, reject, toggle, checkpoint
    #[test]
    fn test_screen_scenario() {
        let temp = TempDir::new().unwrap();
        let mut session = session_in(&temp);

        session.add("Buy milk").unwrap();
        assert_eq!(session.len(), 1);

        assert_eq!(session.add("   ").unwrap(), None);
        assert_eq!(session.len(), 1);

        session.toggle(0).unwrap();
        assert!(session.row(0).unwrap().checked);

        // Durable store still shows the old flag until a checkpoint fires
        assert!(!session.store.load_all().unwrap()[0].is_complete);

        session.checkpoint(Checkpoint::Background).unwrap();
        assert!(session.store.load_all().unwrap()[0].is_complete);
    }
}
