use crate::error::Result;
use crate::settings::Settings;

/// Full pipeline: clean, summarize, chart.
pub fn run(settings: &Settings) -> Result<()> {
    println!("Cleaning data...");
    let report = super::clean::run(settings)?;
    tracing::info!(rows_written = report.rows_written, "clean step done");

    println!("\nGenerating financial summary...\n");
    super::report::run(settings)?;

    #[cfg(feature = "charts")]
    {
        println!("\nGenerating charts...");
        super::charts::run(settings)?;
    }

    println!("\nPipeline finished.");
    Ok(())
}
