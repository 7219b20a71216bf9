use serde::Serialize;

use crate::model::item::TodoItem;

/// Counts derived from a todo list at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// `completed / total`; an empty list counts as fully complete.
    pub completion_rate: f64,
}

impl Summary {
    #[must_use]
    pub fn of(items: &[TodoItem]) -> Self {
        let total = items.len();
        let completed = items.iter().filter(|item| item.completed).count();
        #[allow(clippy::cast_precision_loss)]
        let completion_rate = if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        };

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }

    /// Completion rate as a percentage with one decimal, e.g. `"66.7%"`.
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.completion_rate * 100.0)
    }

    /// Text progress bar `width` cells wide, e.g. `[██████░░░░] 60.0%`.
    #[must_use]
    pub fn progress_bar(&self, width: usize) -> String {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((self.completion_rate * width as f64).floor() as usize).min(width);
        format!(
            "[{}{}] {}",
            "█".repeat(filled),
            "░".repeat(width - filled),
            self.percent()
        )
    }

    /// Returns `true` when nothing is left pending.
    #[must_use]
    pub const fn is_all_done(&self) -> bool {
        self.pending == 0
    }
}
