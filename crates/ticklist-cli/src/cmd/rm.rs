//! `tl rm`: Delete an item. Later items move up one index.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;

use super::{Context, ItemRow};
use crate::output::{one_line, render};

#[derive(Args, Debug)]
pub struct RmArgs {
    /// 0-based index of the item, as printed by `tl list`.
    pub index: usize,
}

#[derive(Debug, Serialize)]
struct RmReport {
    removed: ItemRow,
    remaining: usize,
}

/// Execute `tl rm` and save.
///
/// # Errors
///
/// Returns an error if `index` is out of range or the store cannot be
/// loaded or saved.
pub fn run_rm(args: &RmArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let removed = store.remove_at(args.index)?;
    ctx.save_store(&store)?;

    let report = RmReport {
        removed: ItemRow::new(args.index, &removed),
        remaining: store.count(),
    };
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, &report, |r, w| {
        writeln!(
            w,
            "✓ Removed #{}: {} ({} left)",
            r.removed.index,
            one_line(&r.removed.text),
            r.remaining
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RmArgs,
    }

    #[test]
    fn parses_index() {
        let w = Wrapper::parse_from(["test", "0"]);
        assert_eq!(w.args.index, 0);
    }
}
