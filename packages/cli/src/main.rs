mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    convert, export, inspect, recover, show_config, ConvertArgs, ExportArgs, InspectArgs,
    RecoverArgs,
};
use tracing_subscriber::EnvFilter;

/// Mindmap CLI - convert, export and recover mind maps
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log codec and autosave activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a mind map between formats
    Convert(ConvertArgs),

    /// Render a mind map to an export-only format
    Export(ExportArgs),

    /// Show structure and statistics of a mind map
    Inspect(InspectArgs),

    /// List, restore or delete autosave slots
    Recover(RecoverArgs),

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Convert(args) => convert(args),
        Command::Export(args) => export(args),
        Command::Inspect(args) => inspect(args),
        Command::Recover(args) => recover(args, &cwd),
        Command::Config => show_config(&cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
