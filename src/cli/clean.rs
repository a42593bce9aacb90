use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::pipeline::{run_cleaning, CleaningReport};
use crate::settings::Settings;

pub fn format_report(report: &CleaningReport) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Check", "Count"]);
    let rows: [(&str, String); 8] = [
        ("Rows read", report.rows_read.to_string()),
        ("Invalid dates", report.invalid_dates.to_string()),
        ("Unknown types", report.unknown_types.to_string()),
        ("Invalid values", report.invalid_values.to_string()),
        ("Signs corrected", report.sign_flips.to_string()),
        ("Rows removed (missing date/value)", report.rows_removed.to_string()),
        ("Rows removed (unknown type)", report.unknown_type_removed.to_string()),
        ("Rows written", report.rows_written.to_string()),
    ];
    for (label, count) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    let mut out = format!("Columns: {}\n{table}\n", report.columns.join(", "));
    if report.category_synthesized {
        out.push_str("No category column; every row set to the default category.\n");
    }
    out
}

pub fn run(settings: &Settings) -> Result<CleaningReport> {
    let report = run_cleaning(settings)?;
    print!("{}", format_report(&report));
    println!("Clean CSV written to {}", settings.output_path.display());
    Ok(report)
}
