use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};
use crate::models::{CleanRow, RawFrame, Transaction, TxnType};

pub const DEFAULT_CATEGORY: &str = "outros";

/// Cells a dataframe reader would treat as missing.
const NULL_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none"];

/// Known misspellings of the two transaction types.
const TYPE_CORRECTIONS: &[(&str, &str)] = &[("saída", "saida"), ("entrda", "entrada")];

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})[/.\-](\d{1,2})[/.\-](\d{1,4})$").expect("date pattern is valid")
});

/// Trailing time of day with optional fraction and `Z` or `+hh:mm` offset.
static TIME_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?\s*(?:z|utc|[+\-]\d{2}:?\d{2})?$")
        .expect("time pattern is valid")
});

/// Forms with a month name, tried in order.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// What to do with a `type` value outside {entrada, saida}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Pass the value through unchanged.
    #[default]
    Keep,
    /// Remove the row during validation.
    Drop,
    /// Abort the run.
    Reject,
}

pub fn is_null(cell: &str) -> bool {
    let t = cell.trim();
    t.is_empty() || NULL_TOKENS.iter().any(|n| t.eq_ignore_ascii_case(n))
}

fn require_column(frame: &RawFrame, name: &str) -> Result<usize> {
    frame
        .column_index(name)
        .ok_or_else(|| CleanError::MissingColumn(name.to_string()))
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub fn normalize_column_name(raw: &str) -> String {
    raw.replace('\u{feff}', "")
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

pub fn normalize_columns(frame: &mut RawFrame) {
    for col in frame.columns.iter_mut() {
        *col = normalize_column_name(col);
    }
    tracing::info!(columns = ?frame.columns, "normalized columns");
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(s[..4].parse().ok()?, s[4..6].parse().ok()?, s[6..].parse().ok()?);
    }
    let caps = DATE_RE.captures(s)?;
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);
    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }
    let year: i32 = match c.len() {
        4 => c.parse().ok()?,
        2 => {
            let yy: i32 = c.parse().ok()?;
            if yy < 70 { 2000 + yy } else { 1900 + yy }
        }
        _ => return None,
    };
    let (first, second): (u32, u32) = (a.parse().ok()?, b.parse().ok()?);
    // Month-first only when day-first cannot be a real date.
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Day-first parse: `01/02/2024` is 1 Feb, while `01/13/2024` falls back to
/// 13 Jan. Also reads ISO `yyyy-mm-dd`, compact `yyyymmdd` and English month
/// names (`15 jan 2024`, `Jan 15, 2024`). A time-of-day or timezone suffix is ignored.
pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let s = match TIME_SUFFIX_RE.find(trimmed) {
        Some(m) => trimmed[..m.start()].trim_end(),
        None => trimmed,
    };
    if s.is_empty() {
        return None;
    }
    parse_numeric_date(s).or_else(|| {
        NAMED_MONTH_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    })
}

/// Returns the parsed column and the number of cells that did not parse.
pub fn clean_dates(frame: &RawFrame) -> Result<(Vec<Option<NaiveDate>>, usize)> {
    let idx = require_column(frame, "date")?;
    let dates: Vec<Option<NaiveDate>> = frame
        .column(idx)
        .map(|cell| if is_null(cell) { None } else { parse_date_dmy(cell) })
        .collect();
    let invalid = dates.iter().filter(|d| d.is_none()).count();
    if invalid > 0 {
        tracing::warn!(invalid, "invalid dates found");
    }
    Ok((dates, invalid))
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

pub fn normalize_type(raw: &str) -> TxnType {
    if is_null(raw) {
        return TxnType::Other(String::new());
    }
    let lowered = raw.to_lowercase();
    let t = lowered.trim();
    let corrected = TYPE_CORRECTIONS
        .iter()
        .find(|(from, _)| *from == t)
        .map_or(t, |(_, to)| *to);
    TxnType::from(corrected.to_string())
}

/// Returns the coerced column and the number of values outside the known set.
pub fn clean_types(frame: &RawFrame, policy: UnknownTypePolicy) -> Result<(Vec<TxnType>, usize)> {
    let idx = require_column(frame, "type")?;
    let types: Vec<TxnType> = frame.column(idx).map(normalize_type).collect();

    if policy == UnknownTypePolicy::Reject {
        let rejected = types
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_known() && !t.is_missing());
        if let Some((row, t)) = rejected {
            return Err(CleanError::UnknownType {
                row: row + 1,
                value: t.as_str().to_string(),
            });
        }
    }

    let unknown = types.iter().filter(|t| !t.is_known()).count();
    if unknown > 0 {
        tracing::warn!(unknown, ?policy, "unrecognized transaction types");
    }
    Ok((types, unknown))
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Parse a money cell in either pt-BR (`1.000,50`) or international (`1000.50`) form.
pub fn parse_value(raw: &str) -> Option<Decimal> {
    if is_null(raw) {
        return None;
    }
    let stripped: String = raw
        .replace("R$", "")
        .replace('$', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let s = if stripped.contains(',') {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped
    };
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

pub struct ValueColumn {
    pub values: Vec<Option<Decimal>>,
    pub invalid: usize,
    pub flipped: usize,
}

/// Flip values whose sign contradicts their type. Returns the number flipped.
pub fn correct_signs(values: &mut [Option<Decimal>], types: &[TxnType]) -> usize {
    let mut flipped = 0usize;
    for (value, kind) in values.iter_mut().zip(types) {
        let Some(v) = value.as_mut() else { continue };
        let wrong = match kind {
            TxnType::Entrada => v.is_sign_negative() && !v.is_zero(),
            TxnType::Saida => v.is_sign_positive() && !v.is_zero(),
            TxnType::Other(_) => false,
        };
        if wrong {
            *v = -*v;
            flipped += 1;
        }
    }
    flipped
}

/// Parse the whole column, then run the sign pass against the already-coerced types.
pub fn clean_values(frame: &RawFrame, types: &[TxnType]) -> Result<ValueColumn> {
    let idx = require_column(frame, "value")?;
    let mut values: Vec<Option<Decimal>> = frame.column(idx).map(parse_value).collect();

    let invalid = values.iter().filter(|v| v.is_none()).count();
    if invalid > 0 {
        tracing::warn!(invalid, "invalid values found");
    }

    let flipped = correct_signs(&mut values, types);
    if flipped > 0 {
        tracing::info!(flipped, "corrected value signs to match type");
    }
    Ok(ValueColumn { values, invalid, flipped })
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Returns the column and whether it had to be synthesized.
pub fn clean_categories(frame: &RawFrame, default: &str) -> (Vec<String>, bool) {
    let Some(idx) = frame.column_index("category") else {
        tracing::warn!(default, "category column missing, filled with default");
        return (vec![default.to_string(); frame.rows.len()], true);
    };
    let categories = frame
        .column(idx)
        .map(|cell| {
            if is_null(cell) {
                default.to_string()
            } else {
                cell.trim().to_string()
            }
        })
        .collect();
    (categories, false)
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

pub struct CoercedColumns {
    pub dates: Vec<Option<NaiveDate>>,
    pub types: Vec<TxnType>,
    pub values: Vec<Option<Decimal>>,
    pub categories: Vec<String>,
    pub extras: Vec<Vec<String>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    /// Missing `date` or `value`.
    pub critical: usize,
    /// Unknown, non-null type under [`UnknownTypePolicy::Drop`].
    pub unknown_type: usize,
}

pub fn remove_invalid_rows(cols: CoercedColumns, policy: UnknownTypePolicy) -> (Vec<CleanRow>, Removed) {
    let mut removed = Removed::default();
    let mut rows = Vec::with_capacity(cols.dates.len());

    let iter = cols
        .dates
        .into_iter()
        .zip(cols.types)
        .zip(cols.values)
        .zip(cols.categories)
        .zip(cols.extras);
    for ((((date, kind), value), category), extras) in iter {
        let (Some(date), Some(value)) = (date, value) else {
            removed.critical += 1;
            continue;
        };
        if policy == UnknownTypePolicy::Drop && !kind.is_known() && !kind.is_missing() {
            removed.unknown_type += 1;
            continue;
        }
        rows.push(CleanRow {
            txn: Transaction { date, kind, value, category },
            extras,
        });
    }

    if removed.critical > 0 {
        tracing::warn!(removed = removed.critical, "rows removed for missing critical data");
    }
    if removed.unknown_type > 0 {
        tracing::warn!(removed = removed.unknown_type, "rows removed for unknown type");
    }
    (rows, removed)
}
