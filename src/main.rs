mod analysis;
#[cfg(feature = "charts")]
mod charts;
mod cleaner;
mod cli;
mod error;
mod fmt;
mod loader;
mod logging;
mod models;
mod pipeline;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;

fn run(args: Cli) -> Result<()> {
    let settings = args.overrides.resolve()?;
    let _guard = logging::init(&settings.log_dir)?;

    let result = match args.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::run::run(&settings),
        Commands::Clean => cli::clean::run(&settings).map(|_| ()),
        Commands::Report => cli::report::run(&settings),
        #[cfg(feature = "charts")]
        Commands::Charts => cli::charts::run(&settings),
        Commands::Config => cli::config::run(&settings),
    };
    if let Err(e) = &result {
        tracing::error!(error = %e, "run failed");
    }
    result
}

fn main() {
    let args = Cli::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
