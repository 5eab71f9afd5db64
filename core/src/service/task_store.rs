use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::PersistMode;
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::repository::KeyValueStorage;
use crate::service::command::TaskCommand;

/// Storage key holding the whole collection.
pub const TASKS_KEY: &str = "todos";

/// Owns the task collection and mirrors it to a [`KeyValueStorage`].
///
/// Mutations never fail: an unknown id is a no-op, and a storage write
/// failure is logged while the in-memory collection stays authoritative.
/// The store then remains dirty, so the next mutation or [`TaskStore::flush`]
/// writes again.
pub struct TaskStore<S: KeyValueStorage> {
    storage: S,
    tasks: Vec<Task>,
    // None once the counter has passed u64::MAX.
    next_id: Option<u64>,
    persist: PersistMode,
    dirty: bool,
}

impl<S: KeyValueStorage> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self::open(storage, PersistMode::default())
    }

    pub fn open(storage: S, persist: PersistMode) -> Self {
        let tasks = load(&storage);
        let next_id = next_id_after(&tasks);
        info!(count = tasks.len(), ?persist, "task store opened");
        Self {
            storage,
            tasks,
            next_id,
            persist,
            dirty: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Appends a new active task. Text is not validated; empty is accepted.
    pub fn add(&mut self, text: impl Into<String>, category: impl Into<String>, date: impl Into<String>) -> &[Task] {
        let id = self.allocate_id();
        let task = Task::new(id, text.into(), category.into(), date.into());
        debug!(%id, text = %task.text, "adding task");
        self.tasks.push(task);
        self.changed();
        &self.tasks
    }

    pub fn remove(&mut self, id: TaskId) -> &[Task] {
        let initial_len = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == initial_len {
            debug!(%id, "remove: no such task");
        } else {
            debug!(%id, "removed task");
        }
        // Persisted even on a miss, matching every other mutation.
        self.changed();
        &self.tasks
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> &[Task] {
        let mut found = false;
        // Collections written by older clients may repeat an id; every match flips.
        for task in self.tasks.iter_mut().filter(|t| t.id == id) {
            task.toggle();
            found = true;
        }
        if !found {
            debug!(%id, "toggle: no such task");
        }
        self.changed();
        &self.tasks
    }

    pub fn apply(&mut self, command: TaskCommand) -> &[Task] {
        match command {
            TaskCommand::Add(TaskDraft { text, category, date }) => self.add(text, category, date),
            TaskCommand::Remove(id) => self.remove(id),
            TaskCommand::ToggleComplete(id) => self.toggle_complete(id),
        }
    }

    /// Writes the full collection to storage and clears the dirty flag.
    pub fn flush(&mut self) -> Result<()> {
        let encoded = encode_tasks(&self.tasks)?;
        self.storage
            .set(TASKS_KEY, &encoded)
            .with_context(|| format!("Failed to persist {} tasks", self.tasks.len()))?;
        self.dirty = false;
        Ok(())
    }

    fn allocate_id(&mut self) -> TaskId {
        match self.next_id {
            Some(id) => {
                self.next_id = id.checked_add(1);
                TaskId(id)
            }
            None => {
                let used: HashSet<u64> = self.tasks.iter().map(|t| t.id.0).collect();
                // A collection can never hold every u64, so a free id exists.
                let id = (0..=u64::MAX).find(|n| !used.contains(n)).unwrap_or_default();
                warn!(%id, "id counter exhausted; reusing lowest free id");
                TaskId(id)
            }
        }
    }

    fn changed(&mut self) {
        self.dirty = true;
        if self.persist == PersistMode::WriteThrough {
            if let Err(e) = self.flush() {
                error!(error = %format!("{:#}", e), "write failed; keeping tasks in memory");
            }
        }
    }
}

/// Reads the persisted collection. Missing or unreadable data yields an empty list.
pub fn load<S: KeyValueStorage + ?Sized>(storage: &S) -> Vec<Task> {
    let raw = match storage.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "could not read stored tasks; starting empty");
            return Vec::new();
        }
    };
    match decode_tasks(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "stored tasks are malformed; starting empty");
            Vec::new()
        }
    }
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

pub fn decode_tasks(raw: &str) -> Result<Vec<Task>> {
    // A literal `null` was what the browser app stored before its first task.
    let tasks: Option<Vec<Task>> = serde_json::from_str(raw)?;
    Ok(tasks.unwrap_or_default())
}

fn next_id_after(tasks: &[Task]) -> Option<u64> {
    match tasks.iter().map(|t| t.id.0).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::view::{FilterMode, SortOrder};
    use crate::repository::{FileStorage, MemoryStorage};
    use crate::service::view::derive_view;
    use anyhow::anyhow;
    use tempfile::tempdir;

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage disabled"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("storage disabled"))
        }
    }

    fn seeded() -> TaskStore<MemoryStorage> {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add("Buy milk", "Shopping", "2024-01-01");
        store.add("Walk dog", "Home", "");
        store.add("Write report", "Work", "2024-02-01");
        store
    }

    #[test]
    fn test_load_missing_is_empty() {
        assert!(load(&MemoryStorage::new()).is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        assert!(load(&MemoryStorage::with_entry(TASKS_KEY, "{oops")).is_empty());
        assert!(load(&MemoryStorage::with_entry(TASKS_KEY, r#"{"id":1}"#)).is_empty());
        assert!(load(&MemoryStorage::with_entry(TASKS_KEY, "null")).is_empty());
    }

    #[test]
    fn test_load_unreadable_is_empty() {
        assert!(load(&BrokenStorage).is_empty());
        let store = TaskStore::new(BrokenStorage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_appends_active_task() {
        let mut store = seeded();
        let before = store.snapshot();
        let after = store.add("Call mom", "Family", "today").to_vec();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], before.as_slice());
        let last = after.last().unwrap();
        assert_eq!(last.text, "Call mom");
        assert_eq!(last.category, "Family");
        assert_eq!(last.date, "today");
        assert!(!last.is_completed);
    }

    #[test]
    fn test_add_accepts_empty_text() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add("", "", "");
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].text, "");
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.snapshot();
        assert_eq!(store.remove(TaskId(999)), before.as_slice());
        assert_eq!(store.toggle_complete(TaskId(999)), before.as_slice());
    }

    #[test]
    fn test_remove_by_id() {
        let mut store = seeded();
        let id = store.tasks()[1].id;
        let after = store.remove(id).to_vec();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|t| t.id != id));
        assert_eq!(after[0].text, "Buy milk");
        assert_eq!(after[1].text, "Write report");
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut store = seeded();
        let before = store.snapshot();
        let id = before[0].id;

        let once = store.toggle_complete(id).to_vec();
        assert!(once[0].is_completed);
        assert_eq!(&once[1..], &before[1..]);

        let twice = store.toggle_complete(id).to_vec();
        assert_eq!(twice, before);
    }

    #[test]
    fn test_ids_unique_after_remove_and_reload() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        store.add("a", "", "");
        store.add("b", "", "");
        let last = store.tasks()[1].id;
        store.remove(last);
        store.add("c", "", "");
        drop(store);

        let mut reopened = TaskStore::new(&storage);
        reopened.add("d", "", "");
        let mut ids: Vec<TaskId> = reopened.tasks().iter().map(|t| t.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_next_id_follows_loaded_ids() {
        let raw = r#"[{"id":512,"text":"a","category":"","isCompleted":false},
                      {"id":37,"text":"b","category":"","isCompleted":true}]"#;
        let mut store = TaskStore::new(MemoryStorage::with_entry(TASKS_KEY, raw));
        store.add("c", "", "");
        assert_eq!(store.tasks()[2].id, TaskId(513));
    }

    #[test]
    fn test_add_after_max_id_reuses_free_ids() {
        let raw = r#"[{"id":18446744073709551615,"text":"a","category":"","isCompleted":false},
                      {"id":0,"text":"b","category":"","isCompleted":false}]"#;
        let mut store = TaskStore::new(MemoryStorage::with_entry(TASKS_KEY, raw));
        store.add("c", "", "");
        store.add("d", "", "");
        let ids: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(u64::MAX), TaskId(0), TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_counter_reaching_max_then_falls_back() {
        let raw = r#"[{"id":18446744073709551614,"text":"a","category":"","isCompleted":false}]"#;
        let mut store = TaskStore::new(MemoryStorage::with_entry(TASKS_KEY, raw));
        store.add("b", "", "");
        store.add("c", "", "");
        assert_eq!(store.tasks()[1].id, TaskId(u64::MAX));
        assert_eq!(store.tasks()[2].id, TaskId(0));
    }

    #[test]
    fn test_null_field_keeps_collection() {
        let raw = r#"[{"id":1,"text":"a","category":null,"isCompleted":false},
                      {"id":2,"text":"b","category":"Casa","date":null,"isCompleted":true}]"#;
        let storage = MemoryStorage::with_entry(TASKS_KEY, raw);
        let mut store = TaskStore::new(&storage);
        assert_eq!(store.len(), 2);
        store.add("c", "", "");
        assert_eq!(load(&storage).len(), 3);
    }

    #[test]
    fn test_duplicate_ids_all_toggle() {
        let raw = r#"[{"id":5,"text":"a","category":"","isCompleted":false},
                      {"id":5,"text":"b","category":"","isCompleted":false}]"#;
        let mut store = TaskStore::new(MemoryStorage::with_entry(TASKS_KEY, raw));
        store.toggle_complete(TaskId(5));
        assert!(store.tasks().iter().all(|t| t.is_completed));
        store.remove(TaskId(5));
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_through_persists_every_mutation() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        store.add("Buy milk", "Shopping", "2024-01-01");
        assert!(!store.is_dirty());
        assert_eq!(load(&storage), store.snapshot());

        let id = store.tasks()[0].id;
        store.toggle_complete(id);
        assert!(load(&storage)[0].is_completed);
    }

    #[test]
    fn test_write_behind_waits_for_flush() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(&storage, PersistMode::WriteBehind);
        store.add("Buy milk", "Shopping", "");
        assert!(store.is_dirty());
        assert!(load(&storage).is_empty());

        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(load(&storage), store.snapshot());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = MemoryStorage::new();
        storage.set_read_only(true);
        let mut store = TaskStore::new(&storage);
        store.add("Buy milk", "Shopping", "");
        assert_eq!(store.len(), 1);
        assert!(store.is_dirty());
        assert!(store.flush().is_err());

        storage.set_read_only(false);
        store.flush().unwrap();
        assert_eq!(load(&storage).len(), 1);
    }

    #[test]
    fn test_apply_commands() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.apply(TaskCommand::Add(TaskDraft::new("Read", "Books", "")));
        let id = store.tasks()[0].id;
        store.apply(TaskCommand::ToggleComplete(id));
        assert!(store.get(id).unwrap().is_completed);
        store.apply(TaskCommand::Remove(id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_completion_scenario() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add("Buy milk", "Shopping", "2024-01-01");
        assert_eq!(store.len(), 1);
        assert!(!store.tasks()[0].is_completed);

        let id = store.tasks()[0].id;
        store.toggle_complete(id);
        assert!(store.tasks()[0].is_completed);

        let completed = derive_view(store.tasks(), "", FilterMode::Completed, SortOrder::Asc);
        let active = derive_view(store.tasks(), "", FilterMode::Active, SortOrder::Asc);
        assert!(completed.iter().any(|t| t.id == id));
        assert!(active.iter().all(|t| t.id != id));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf())).unwrap();
        let mut store = TaskStore::new(storage.clone());
        store.add("Buy milk", "Shopping", "2024-01-01");
        store.add("Água", "Casa", "");
        let id = store.tasks()[0].id;
        store.toggle_complete(id);
        let expected = store.snapshot();
        drop(store);

        let reopened = TaskStore::new(storage);
        assert_eq!(reopened.tasks(), expected.as_slice());
    }
}
