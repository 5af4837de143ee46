//! boxmerge CLI - Concurrent merger of daily behaviour-box logs.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod display;
mod logging;

use commands::merge::MergeArgs;
use commands::plan::PlanArgs;
use commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "boxmerge")]
#[command(about = "Merge daily behaviour-box logs from a lab file share", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output and summaries)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every box's day files and merge them into one archive per box
    Merge(MergeArgs),

    /// Show the units a merge would process and an estimate of its size
    Plan(PlanArgs),

    /// Search merged archives for identifiers such as animal IDs
    Search(SearchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Merge(args) => commands::merge::merge(args, cli.quiet).await,
        Commands::Plan(args) => commands::plan::plan(args, cli.quiet).await,
        Commands::Search(args) => commands::search::search(args, cli.quiet),
    }
}
