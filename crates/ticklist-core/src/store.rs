//! The todo store: an ordered list of items plus its durable location.
//!
//! Items are addressed by 0-based position. Mutations never touch disk; the
//! caller decides when to [`TodoStore::save`]. Every failed call leaves the
//! in-memory list exactly as it was.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{PersistenceError, StoreError};
use crate::lock::DEFAULT_LOCK_TIMEOUT;
use crate::markdown;
use crate::model::item::TodoItem;
use crate::persist;
use crate::stats::Summary;

/// Owner of the todo list and its save/load contract.
#[derive(Debug, Clone)]
pub struct TodoStore {
    items: Vec<TodoItem>,
    path: Option<PathBuf>,
    lock_timeout: Duration,
}

impl TodoStore {
    /// An empty store that saves to and loads from `path`.
    ///
    /// Nothing is read; call [`TodoStore::load`] or use [`TodoStore::open`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            items: Vec::new(),
            path: Some(path.into()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// An empty store with no durable location. `save` and `load` fail with
    /// [`PersistenceError::NoLocation`].
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            items: Vec::new(),
            path: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Bind to `path` and load whatever is stored there.
    ///
    /// # Errors
    ///
    /// Fails as [`TodoStore::load`] does.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Override how long save/load wait for a contended file lock.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The durable location, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // --- mutation ---------------------------------------------------------

    /// Append a pending item and return its index.
    pub fn add(&mut self, text: impl Into<String>) -> usize {
        self.items.push(TodoItem::new(text));
        let index = self.items.len() - 1;
        debug!(index, "added item");
        index
    }

    /// Remove the item at `index`, shifting later items down by one.
    ///
    /// # Errors
    ///
    /// [`StoreError::OutOfRange`] if `index >= count()`.
    pub fn remove_at(&mut self, index: usize) -> Result<TodoItem, StoreError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        debug!(index, remaining = self.items.len(), "removed item");
        Ok(removed)
    }

    /// Flip the completion flag at `index` and return the new value.
    ///
    /// # Errors
    ///
    /// [`StoreError::OutOfRange`] if `index >= count()`.
    pub fn toggle_at(&mut self, index: usize) -> Result<bool, StoreError> {
        let item = self.item_mut(index)?;
        let completed = item.toggle();
        debug!(index, completed, "toggled item");
        Ok(completed)
    }

    /// Append `items` in order, keeping their completion flags.
    pub fn import(&mut self, items: impl IntoIterator<Item = TodoItem>) -> usize {
        let before = self.items.len();
        self.items.extend(items);
        let added = self.items.len() - before;
        debug!(added, "imported items");
        added
    }

    // --- queries ----------------------------------------------------------

    /// Text of the item at `index`, copied out.
    ///
    /// # Errors
    ///
    /// [`StoreError::OutOfRange`] if `index >= count()`.
    pub fn text_at(&self, index: usize) -> Result<String, StoreError> {
        self.item(index).map(|item| item.text.clone())
    }

    /// Completion flag of the item at `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::OutOfRange`] if `index >= count()`.
    pub fn is_completed_at(&self, index: usize) -> Result<bool, StoreError> {
        self.item(index).map(|item| item.completed)
    }

    /// Number of items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of completed items, counted on every call.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.count() - self.completed_count()
    }

    /// Non-failing lookup.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TodoItem> {
        self.items.get(index)
    }

    /// All items in display order.
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(&self.items)
    }

    /// The list as a markdown checklist.
    #[must_use]
    pub fn export_markdown(&self) -> String {
        markdown::to_markdown(&self.items)
    }

    // --- persistence ------------------------------------------------------

    /// Atomically replace the stored list with the in-memory one.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if there is no location, the directory is
    /// missing or unwritable, or the lock cannot be taken. The in-memory list
    /// is unaffected either way.
    pub fn save(&self) -> Result<(), StoreError> {
        let path = self.path.as_deref().ok_or(PersistenceError::NoLocation)?;
        persist::save_items(path, &self.items, self.lock_timeout).map_err(|err| {
            warn!(path = %path.display(), error = %err, "save failed");
            StoreError::from(err)
        })
    }

    /// Replace the in-memory list with the stored one. A missing file loads
    /// as an empty list.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if there is no location, the file cannot be
    /// read, or its content does not decode. The in-memory list is only
    /// replaced after a complete, successful decode.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let path = self.path.as_deref().ok_or(PersistenceError::NoLocation)?;
        let items = persist::load_items(path, self.lock_timeout).map_err(|err| {
            warn!(path = %path.display(), error = %err, "load failed");
            StoreError::from(err)
        })?;
        self.items = items;
        Ok(())
    }

    // --- helpers ----------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        let count = self.items.len();
        if index < count {
            Ok(())
        } else {
            Err(StoreError::OutOfRange { index, count })
        }
    }

    fn item(&self, index: usize) -> Result<&TodoItem, StoreError> {
        self.items.get(index).ok_or(StoreError::OutOfRange {
            index,
            count: self.items.len(),
        })
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut TodoItem, StoreError> {
        let count = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, count })
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
