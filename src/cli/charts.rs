use crate::analysis::{build_report, load_clean};
use crate::charts::generate_charts;
use crate::error::Result;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let txns = load_clean(&settings.output_path)?;
    let report = build_report(&txns, settings.fill_empty_months)?;
    for path in generate_charts(&report.by_category, &report.monthly, &settings.charts_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
