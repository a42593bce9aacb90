use std::path::Path;

use serde::Serialize;

use crate::cleaner::{
    clean_categories, clean_dates, clean_types, clean_values, normalize_columns,
    remove_invalid_rows, CoercedColumns,
};
use crate::error::Result;
use crate::loader::load_raw;
use crate::models::{CleanRow, RawFrame};
use crate::settings::Settings;

const CANONICAL_COLUMNS: [&str; 4] = ["date", "type", "value", "category"];

/// Warning counts gathered across one cleaning run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub columns: Vec<String>,
    pub invalid_dates: usize,
    pub unknown_types: usize,
    pub invalid_values: usize,
    pub sign_flips: usize,
    pub category_synthesized: bool,
    pub rows_removed: usize,
    pub unknown_type_removed: usize,
    pub rows_written: usize,
}

/// Cleaned rows plus the names of the pass-through columns, in source order.
#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    pub extra_columns: Vec<String>,
    pub rows: Vec<CleanRow>,
}

// ---------------------------------------------------------------------------
// In-memory stages
// ---------------------------------------------------------------------------

pub fn clean_frame(mut frame: RawFrame, settings: &Settings) -> Result<(CleanedTable, CleaningReport)> {
    let mut report = CleaningReport {
        rows_read: frame.rows.len(),
        ..Default::default()
    };

    normalize_columns(&mut frame);
    report.columns = frame.columns.clone();

    let (dates, invalid_dates) = clean_dates(&frame)?;
    report.invalid_dates = invalid_dates;

    let (types, unknown_types) = clean_types(&frame, settings.unknown_type_policy)?;
    report.unknown_types = unknown_types;

    // Reads the coerced types for the sign pass.
    let values = clean_values(&frame, &types)?;
    report.invalid_values = values.invalid;
    report.sign_flips = values.flipped;

    let (categories, synthesized) = clean_categories(&frame, &settings.default_category);
    report.category_synthesized = synthesized;

    let extra_idx: Vec<usize> = frame
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !CANONICAL_COLUMNS.contains(&c.as_str()))
        .map(|(i, _)| i)
        .collect();
    let extra_columns = extra_idx.iter().map(|&i| frame.columns[i].clone()).collect();
    let extras = frame
        .rows
        .iter()
        .map(|row| extra_idx.iter().map(|&i| row[i].clone()).collect())
        .collect();

    let cols = CoercedColumns {
        dates,
        types,
        values: values.values,
        categories,
        extras,
    };
    let (rows, removed) = remove_invalid_rows(cols, settings.unknown_type_policy);
    report.rows_removed = removed.critical;
    report.unknown_type_removed = removed.unknown_type;
    report.rows_written = rows.len();

    Ok((CleanedTable { extra_columns, rows }, report))
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

pub fn write_clean(output_path: &Path, table: &CleanedTable) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::Writer::from_path(output_path)?;

    let mut header: Vec<&str> = CANONICAL_COLUMNS.to_vec();
    header.extend(table.extra_columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let t = &row.txn;
        let mut record = vec![
            t.date.format("%Y-%m-%d").to_string(),
            t.kind.as_str().to_string(),
            t.value.to_string(),
            t.category.clone(),
        ];
        record.extend(row.extras.iter().cloned());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    tracing::info!(path = %output_path.display(), rows = table.rows.len(), "clean data saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// run_cleaning
// ---------------------------------------------------------------------------

/// load -> normalize -> dates -> type -> values -> categories -> validate -> persist
pub fn run_cleaning(settings: &Settings) -> Result<CleaningReport> {
    tracing::info!("starting cleaning pipeline");
    let frame = load_raw(&settings.input_path)?;
    let (table, report) = clean_frame(frame, settings)?;
    write_clean(&settings.output_path, &table)?;
    tracing::info!(
        rows_read = report.rows_read,
        rows_written = report.rows_written,
        invalid_dates = report.invalid_dates,
        invalid_values = report.invalid_values,
        rows_removed = report.rows_removed,
        "cleaning pipeline finished"
    );
    Ok(report)
}
