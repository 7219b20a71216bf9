use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::{Context, ItemRow};
use crate::output::{one_line, render};

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// 0-based index of the item, as printed by `tl list`.
    pub index: usize,
}

/// Execute `tl toggle` and save.
///
/// # Errors
///
/// Returns an error if `index` is out of range or the store cannot be
/// loaded or saved.
pub fn run_toggle(args: &ToggleArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    store.toggle_at(args.index)?;
    ctx.save_store(&store)?;

    let Some(item) = store.get(args.index) else {
        anyhow::bail!("item {} vanished after toggle", args.index);
    };
    let row = ItemRow::new(args.index, item);

    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, &row, |r, w| {
        let verb = if r.completed { "done" } else { "pending" };
        writeln!(w, "✓ Marked #{} {verb}: {}", r.index, one_line(&r.text))
    })
}
