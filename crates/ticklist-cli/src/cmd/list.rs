//! `tl list`: Show items in insertion order.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;

use ticklist_core::Status;

use super::{Context, ItemRow};
use crate::output::{OutputMode, pretty_section, render_mode, write_list};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show items with this status (pending, done; also todo, open,
    /// completed).
    #[arg(long, value_name = "STATUS", conflicts_with_all = ["pending", "done"])]
    pub status: Option<Status>,

    /// Only show pending items. Same as `--status pending`.
    #[arg(long, conflicts_with = "done")]
    pub pending: bool,

    /// Only show completed items. Same as `--status done`.
    #[arg(long)]
    pub done: bool,
}

impl ListArgs {
    fn wanted(&self) -> Option<Status> {
        self.status.or(if self.pending {
            Some(Status::Pending)
        } else if self.done {
            Some(Status::Done)
        } else {
            None
        })
    }

    fn keeps(&self, row: &ItemRow) -> bool {
        self.wanted().is_none_or(|status| status == row.status)
    }
}

#[derive(Debug, Serialize)]
struct ListReport {
    items: Vec<ItemRow>,
    total: usize,
    completed: usize,
    pending: usize,
}

/// Execute `tl list`. Filtering hides rows but never renumbers them: the
/// printed index is always the item's position in the full list.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let summary = store.summary();

    let items: Vec<ItemRow> = ItemRow::all(&store)
        .into_iter()
        .filter(|row| args.keeps(row))
        .collect();

    let report = ListReport {
        items,
        total: summary.total,
        completed: summary.completed,
        pending: summary.pending,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| write_list(w, &r.items, OutputMode::Text),
        |r, w| {
            pretty_section(
                w,
                &format!("Todo list ({} done / {} total)", r.completed, r.total),
            )?;
            if r.items.is_empty() {
                if r.total == 0 {
                    writeln!(w, "No items. Add one with `tl add <text>`.")
                } else {
                    writeln!(w, "No matching items.")
                }
            } else {
                write_list(w, &r.items, OutputMode::Pretty)
            }
        },
    )
}
