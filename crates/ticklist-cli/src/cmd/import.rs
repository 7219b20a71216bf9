//! `tl import`: Append items from a markdown checklist.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use ticklist_core::markdown::parse_markdown;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Markdown file containing `- [ ]` / `- [x]` lines.
    #[arg(value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    imported: usize,
    completed: usize,
    total: usize,
}

/// Execute `tl import` and save.
///
/// # Errors
///
/// Returns an error if the markdown file cannot be read, or the store cannot
/// be loaded or saved.
pub fn run_import(args: &ImportArgs, ctx: &Context) -> Result<()> {
    let input = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let items = parse_markdown(&input);
    let completed = items.iter().filter(|item| item.completed).count();

    if items.is_empty() {
        tracing::warn!(path = %args.file.display(), "no checklist items found");
    }

    let mut store = ctx.open_store()?;
    let imported = store.import(items);
    ctx.save_store(&store)?;

    let report = ImportReport {
        imported,
        completed,
        total: store.count(),
    };
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, &report, |r, w| {
        writeln!(
            w,
            "✓ Imported {} item(s), {} already done ({} total)",
            r.imported, r.completed, r.total
        )
    })
}
