use anyhow::Result;
use clap::Args;
use std::io::{self, Write};
use ticklist_core::TodoItem;

use super::{Context, ItemRow};
use crate::output::{Renderable, pretty_kv, render_item};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// 0-based index of the item, as printed by `tl list`.
    pub index: usize,
}

/// Multi-line view of a single item; JSON and text match [`ItemRow`].
struct ItemDetail(ItemRow);

impl Renderable for ItemDetail {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_kv(w, "Index", self.0.index.to_string())?;
        pretty_kv(w, "Status", self.0.status.as_str())?;
        writeln!(w, "Text:")?;
        for line in self.0.text.split('\n') {
            writeln!(w, "  {line}")?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        self.0.render_json(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        self.0.render_table(w)
    }
}

/// Execute `tl show`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or `index` is out of range.
pub fn run_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let text = store.text_at(args.index)?;
    let completed = store.is_completed_at(args.index)?;
    let row = ItemRow::new(args.index, &TodoItem::with_completed(text, completed));

    render_item(&ItemDetail(row), ctx.output)?;
    Ok(())
}
