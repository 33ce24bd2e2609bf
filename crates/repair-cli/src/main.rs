// CLI for running share-repair experiments

use clap::{Parser, Subcommand};
use repair_cli::commands::designs::{handle_designs_command, DesignsCommand};
use repair_cli::commands::run::{handle_run_command, RunCommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repair-sim")]
#[command(about = "Compare share-repair strategies over block designs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in block designs
    Designs(DesignsCommand),

    /// Run a repair sweep and export the results
    Run(RunCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Designs(cmd) => handle_designs_command(&cmd, &mut out)?,
        Commands::Run(cmd) => {
            handle_run_command(&cmd, &mut out)?;
        }
    }
    Ok(())
}
