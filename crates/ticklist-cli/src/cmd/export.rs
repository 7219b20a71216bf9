//! `tl export`: Write the list as a markdown checklist.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use ticklist_core::persist::write_atomic;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    items: usize,
    markdown: String,
}

/// Execute `tl export`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or the output file cannot
/// be written.
pub fn run_export(args: &ExportArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let markdown = store.export_markdown();

    if let Some(path) = &args.output {
        write_atomic(path, markdown.as_bytes())
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        tracing::info!(path = %path.display(), items = store.count(), "exported markdown");
    }

    let report = ExportReport {
        path: args.output.as_ref().map(|p| p.display().to_string()),
        items: store.count(),
        markdown,
    };
    render(ctx.output, &report, |r, w| match &r.path {
        Some(path) if !ctx.quiet => writeln!(w, "✓ Exported {} item(s) to {path}", r.items),
        Some(_) => Ok(()),
        None => w.write_all(r.markdown.as_bytes()),
    })
}
