#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use ticklist_core::ErrorCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tl: a small, durable todo list",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and the user config).
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Todo file to operate on (overrides TICKLIST_FILE and the user config).
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output mode from flags alone, used before config has been resolved.
    fn flag_output_mode(&self) -> OutputMode {
        match (self.format, self.json) {
            (Some(mode), _) => mode,
            (None, true) => OutputMode::Json,
            (None, false) => OutputMode::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Create an empty todo file",
        after_help = "EXAMPLES:\n    # Create the default todo file\n    tl init\n\n    # Start over with an empty list\n    tl init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Editing",
        about = "Append one or more items",
        after_help = "EXAMPLES:\n    # Add a single item\n    tl add \"buy milk\"\n\n    # Add several items at once\n    tl add \"write report\" \"call mum\"\n\n    # Text that starts with a dash\n    tl add -- \"-5 pushups\""
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Editing",
        visible_alias = "tick",
        about = "Flip an item between done and pending",
        after_help = "EXAMPLES:\n    # Mark the first item done (or pending again)\n    tl toggle 0"
    )]
    Toggle(cmd::toggle::ToggleArgs),

    #[command(
        next_help_heading = "Editing",
        visible_alias = "remove",
        about = "Delete an item; later items shift down",
        after_help = "EXAMPLES:\n    # Remove the second item\n    tl rm 1"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Reading",
        visible_alias = "ls",
        about = "List items with their indices",
        after_help = "EXAMPLES:\n    # Everything\n    tl list\n\n    # Only what is left to do\n    tl list --pending\n\n    # Machine-readable\n    tl list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Reading",
        about = "Show one item in full",
        after_help = "EXAMPLES:\n    tl show 2"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Reading",
        about = "Show completion totals and a progress bar",
        after_help = "EXAMPLES:\n    tl stats\n\n    # A wider bar\n    tl stats --width 40"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Interchange",
        about = "Export the list as a markdown checklist",
        after_help = "EXAMPLES:\n    # Print to stdout\n    tl export\n\n    # Write a file\n    tl export -o TODO.md"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Interchange",
        about = "Append items from a markdown checklist",
        after_help = "EXAMPLES:\n    tl import TODO.md"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Interchange",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    tl completions bash > ~/.local/share/bash-completion/completions/tl"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TICKLIST_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ticklist=debug,warn"
        } else {
            "warn"
        })
    });

    let format = env::var("TICKLIST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn dispatch(command: Commands, ctx: &cmd::Context) -> anyhow::Result<()> {
    match command {
        Commands::Init(args) => cmd::init::run_init(&args, ctx),
        Commands::Add(args) => cmd::add::run_add(&args, ctx),
        Commands::Toggle(args) => cmd::toggle::run_toggle(&args, ctx),
        Commands::Rm(args) => cmd::rm::run_rm(&args, ctx),
        Commands::List(args) => cmd::list::run_list(&args, ctx),
        Commands::Show(args) => cmd::show::run_show(&args, ctx),
        Commands::Stats(args) => cmd::stats::run_stats(&args, ctx),
        Commands::Export(args) => cmd::export::run_export(&args, ctx),
        Commands::Import(args) => cmd::import::run_import(&args, ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn fail(output: OutputMode, error: &CliError, err: &anyhow::Error) -> ! {
    if render_error(output, error).is_err() {
        eprintln!("error: {err:#}");
    }
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match ticklist_core::config::resolve_config(
        cli.file.as_deref(),
        cli.format.map(OutputMode::as_str),
        cli.json,
    ) {
        Ok(config) => config,
        Err(err) => {
            let code = ErrorCode::ConfigParseError;
            let error = CliError {
                message: format!("{err:#}"),
                suggestion: code.hint().map(str::to_string),
                error_code: Some(code.code().to_string()),
            };
            fail(cli.flag_output_mode(), &error, &err)
        }
    };
    debug!(
        store = %config.store_path.display(),
        output = %config.resolved_output,
        "resolved configuration"
    );

    let ctx = cmd::Context {
        store_path: config.store_path,
        lock_timeout: config.lock_timeout,
        output: OutputMode::from_name(&config.resolved_output),
        quiet: cli.quiet,
    };

    if let Err(err) = dispatch(cli.command, &ctx) {
        fail(ctx.output, &CliError::from_anyhow(&err), &err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["tl", "--json", "list"]);
        assert!(cli.json);
        assert!(cli.flag_output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tl", "list", "--json"]);
        assert!(cli.json);
        assert!(cli.flag_output_mode().is_json());
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["tl", "--json", "--format", "pretty", "stats"]);
        assert_eq!(cli.flag_output_mode(), OutputMode::Pretty);
    }

    #[test]
    fn file_flag_is_global() {
        let cli = Cli::parse_from(["tl", "add", "x", "--file", "/tmp/t.json"]);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/t.json")));
        assert!(matches!(cli.command, Commands::Add(_)));
    }

    #[test]
    fn quiet_and_verbose_flags_parse() {
        let cli = Cli::parse_from(["tl", "-q", "-v", "list"]);
        assert!(cli.quiet);
        assert!(cli.verbose);
    }

    #[test]
    fn aliases_resolve_to_commands() {
        assert!(matches!(
            Cli::parse_from(["tl", "tick", "0"]).command,
            Commands::Toggle(cmd::toggle::ToggleArgs { index: 0 })
        ));
        assert!(matches!(
            Cli::parse_from(["tl", "ls"]).command,
            Commands::List(_)
        ));
        assert!(matches!(
            Cli::parse_from(["tl", "remove", "3"]).command,
            Commands::Rm(cmd::rm::RmArgs { index: 3 })
        ));
    }

    #[test]
    fn completions_subcommand_parses_shell() {
        let cli = Cli::parse_from(["tl", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
