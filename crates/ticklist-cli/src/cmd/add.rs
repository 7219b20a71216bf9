//! `tl add`: Append one or more items.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;

use super::{Context, ItemRow};
use crate::output::{one_line, render};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Text of each item to add. Every argument becomes one item; put
    /// texts that start with `-` after `--`.
    #[arg(required = true, num_args = 1..)]
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AddReport {
    added: Vec<ItemRow>,
    total: usize,
}

/// Execute `tl add`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or saved.
pub fn run_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;

    let mut added = Vec::with_capacity(args.texts.len());
    for text in &args.texts {
        let index = store.add(text.as_str());
        if let Some(item) = store.get(index) {
            added.push(ItemRow::new(index, item));
        }
    }
    ctx.save_store(&store)?;

    let report = AddReport {
        added,
        total: store.count(),
    };
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, &report, |r, w| {
        for row in &r.added {
            writeln!(w, "✓ Added #{}: {}", row.index, one_line(&row.text))?;
        }
        Ok(())
    })
}
