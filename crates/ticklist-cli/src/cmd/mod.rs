pub mod add;
pub mod completions;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod rm;
pub mod show;
pub mod stats;
pub mod toggle;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Serialize;
use ticklist_core::{Status, TodoItem, TodoStore};

use crate::output::{OutputMode, Renderable, one_line};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub store_path: PathBuf,
    pub lock_timeout: Duration,
    pub output: OutputMode,
    pub quiet: bool,
}

impl Context {
    /// Load the store at the configured location.
    ///
    /// # Errors
    ///
    /// Returns the store's persistence error if the file is unreadable.
    pub fn open_store(&self) -> Result<TodoStore> {
        let mut store = TodoStore::new(&self.store_path).with_lock_timeout(self.lock_timeout);
        store.load()?;
        Ok(store)
    }

    /// Save `store`, creating the store's directory on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the save fails.
    pub fn save_store(&self, store: &TodoStore) -> Result<()> {
        if let Some(parent) = self.store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        store.save()?;
        Ok(())
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

/// One item as shown to the user, with its current index.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    pub index: usize,
    pub text: String,
    pub completed: bool,
    pub status: Status,
}

impl ItemRow {
    pub fn new(index: usize, item: &TodoItem) -> Self {
        let status = item.status();
        Self {
            index,
            text: item.text.clone(),
            completed: status.is_done(),
            status,
        }
    }

    /// Snapshot of every item in display order.
    pub fn all(store: &TodoStore) -> Vec<Self> {
        store
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| Self::new(index, item))
            .collect()
    }
}

impl Renderable for ItemRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let mark = if self.completed { "✓" } else { " " };
        writeln!(w, "{:>3}  [{mark}] {}", self.index, one_line(&self.text))
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}",
            self.index,
            self.status.as_str(),
            one_line(&self.text)
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["INDEX", "STATUS", "TEXT"]
    }
}
