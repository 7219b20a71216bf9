//! `tl init`: Create an empty store file.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use ticklist_core::TodoStore;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing store with an empty one.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    path: String,
    created_dir: bool,
    replaced: bool,
}

/// Execute `tl init`: create the store's directory if needed and write an
/// empty document.
///
/// # Errors
///
/// Returns an error if the store already exists and `--force` is not set, or
/// if the directory or file cannot be written.
pub fn run_init(args: &InitArgs, ctx: &Context) -> Result<()> {
    let path = ctx.store_path();
    let existed = path.exists();

    if existed && !args.force {
        anyhow::bail!(
            "{} already exists. Use `tl init --force` to start over with an empty list.",
            path.display()
        );
    }

    let mut created_dir = false;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            created_dir = true;
        }
    }

    TodoStore::new(path)
        .with_lock_timeout(ctx.lock_timeout)
        .save()?;
    tracing::info!(path = %path.display(), replaced = existed, "initialized store");

    let report = InitReport {
        path: path.display().to_string(),
        created_dir,
        replaced: existed,
    };
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, &report, |r, w| {
        if r.replaced {
            writeln!(w, "✓ Reset empty todo list at {}", r.path)
        } else {
            writeln!(w, "✓ Created empty todo list at {}", r.path)
        }
    })
}
