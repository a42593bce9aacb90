#[cfg(feature = "charts")]
pub mod charts;
pub mod clean;
pub mod config;
pub mod report;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cleaner::UnknownTypePolicy;
use crate::error::Result;
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(name = "finclean", about = "Clean a personal-finance ledger, summarize it and chart expenses.")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw ledger, print the summary and render charts (default).
    Run,
    /// Clean the raw ledger and write the cleaned CSV.
    Clean,
    /// Print the financial summary from the cleaned CSV.
    Report,
    /// Render expense charts from the cleaned CSV.
    #[cfg(feature = "charts")]
    Charts,
    /// Print the effective settings as JSON.
    Config,
}

/// Flags layered over the settings file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Settings file (default: ~/.config/finclean/settings.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Raw ledger to clean
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,
    /// Cleaned CSV destination
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,
    /// Directory for chart files
    #[arg(long = "charts-dir", global = true)]
    pub charts_dir: Option<PathBuf>,
    /// Directory for cleaning.log
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,
    /// Handling of type values other than entrada/saida
    #[arg(long = "unknown-types", value_enum, global = true)]
    pub unknown_types: Option<UnknownTypePolicy>,
    /// Count months without expenses as zero in the monthly average
    #[arg(long = "fill-empty-months", global = true)]
    pub fill_empty_months: bool,
}

impl Overrides {
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = load_settings(self.config.as_deref())?;
        if let Some(p) = &self.input {
            settings.input_path = p.clone();
        }
        if let Some(p) = &self.output {
            settings.output_path = p.clone();
        }
        if let Some(p) = &self.charts_dir {
            settings.charts_dir = p.clone();
        }
        if let Some(p) = &self.log_dir {
            settings.log_dir = p.clone();
        }
        if let Some(policy) = self.unknown_types {
            settings.unknown_type_policy = policy;
        }
        if self.fill_empty_months {
            settings.fill_empty_months = true;
        }
        Ok(settings)
    }
}
