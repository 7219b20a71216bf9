use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use ticklist_core::stats::Summary;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Width of the progress bar in cells.
    #[arg(long, default_value_t = 20)]
    pub width: usize,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    #[serde(flatten)]
    summary: Summary,
    progress: String,
}

/// Execute `tl stats`.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn run_stats(args: &StatsArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let summary = store.summary();
    let report = StatsReport {
        progress: summary.progress_bar(args.width),
        summary,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            writeln!(
                w,
                "total={} completed={} pending={} rate={}",
                r.summary.total,
                r.summary.completed,
                r.summary.pending,
                r.summary.percent()
            )
        },
        |r, w| {
            pretty_section(w, "Progress")?;
            pretty_kv(w, "Total", r.summary.total.to_string())?;
            pretty_kv(w, "Completed", r.summary.completed.to_string())?;
            pretty_kv(w, "Pending", r.summary.pending.to_string())?;
            writeln!(w)?;
            writeln!(w, "{}", r.progress)?;
            if r.summary.total > 0 && r.summary.is_all_done() {
                writeln!(w, "✓ All done.")?;
            }
            Ok(())
        },
    )
}
