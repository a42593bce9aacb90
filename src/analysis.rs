use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{CleanError, Result};
use crate::models::{Transaction, TxnType};

pub fn load_clean(file_path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_path(file_path)?;
    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<Transaction>, _>>()?;
    tracing::info!(path = %file_path.display(), rows = rows.len(), "loaded clean data");
    Ok(rows)
}

fn expenses(txns: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    txns.iter().filter(|t| t.kind == TxnType::Saida)
}

fn add(acc: &mut Decimal, value: Decimal) -> Result<()> {
    *acc = acc
        .checked_add(value)
        .ok_or_else(|| CleanError::Other(format!("Amount overflow while adding {value}")))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_income: Decimal,
    /// Already negative.
    pub total_expense: Decimal,
    pub balance: Decimal,
}

pub fn calculate_totals(txns: &[Transaction]) -> Result<Totals> {
    let mut totals = Totals {
        total_income: Decimal::ZERO,
        total_expense: Decimal::ZERO,
        balance: Decimal::ZERO,
    };
    for t in txns {
        match t.kind {
            TxnType::Entrada => add(&mut totals.total_income, t.value)?,
            TxnType::Saida => add(&mut totals.total_expense, t.value)?,
            TxnType::Other(_) => {}
        }
        add(&mut totals.balance, t.value)?;
    }
    Ok(totals)
}

// ---------------------------------------------------------------------------
// Expenses by category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Absolute expense per category, largest first. Equal totals keep name order.
pub fn expenses_by_category(txns: &[Transaction]) -> Result<Vec<CategoryTotal>> {
    let mut by_cat: BTreeMap<&str, Decimal> = BTreeMap::new();
    for t in expenses(txns) {
        add(by_cat.entry(t.category.as_str()).or_default(), t.value)?;
    }
    let mut items: Vec<CategoryTotal> = by_cat
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total: total.abs(),
        })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(items)
}

// ---------------------------------------------------------------------------
// Monthly expenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTotal {
    /// First day of the month.
    pub month: NaiveDate,
    pub total: Decimal,
}

impl MonthTotal {
    pub fn label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }
}

fn next_month(d: NaiveDate) -> Option<NaiveDate> {
    if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    }
}

/// Absolute expense per calendar month in date order. With `fill_gaps`, months
/// between the first and last expense that had none are listed as zero.
pub fn monthly_expenses(txns: &[Transaction], fill_gaps: bool) -> Result<Vec<MonthTotal>> {
    let mut by_month: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in expenses(txns) {
        let Some(month) = t.date.with_day(1) else { continue };
        add(by_month.entry(month).or_default(), t.value)?;
    }

    if fill_gaps {
        if let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) {
            let mut m = first;
            while m < last {
                by_month.entry(m).or_default();
                match next_month(m) {
                    Some(n) => m = n,
                    None => break,
                }
            }
        }
    }

    Ok(by_month
        .into_iter()
        .map(|(month, total)| MonthTotal {
            month,
            total: total.abs(),
        })
        .collect())
}

fn mean(months: &[MonthTotal]) -> Result<Option<Decimal>> {
    if months.is_empty() {
        return Ok(None);
    }
    let mut sum = Decimal::ZERO;
    for m in months {
        add(&mut sum, m.total)?;
    }
    Ok(Some(sum / Decimal::from(months.len())))
}

/// Mean of the monthly totals. `None` when there are no expenses.
pub fn monthly_average_expense(txns: &[Transaction], fill_gaps: bool) -> Result<Option<Decimal>> {
    mean(&monthly_expenses(txns, fill_gaps)?)
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

pub struct FinancialReport {
    pub totals: Totals,
    pub by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthTotal>,
    pub monthly_average: Option<Decimal>,
}

pub fn build_report(txns: &[Transaction], fill_gaps: bool) -> Result<FinancialReport> {
    let monthly = monthly_expenses(txns, fill_gaps)?;
    let monthly_average = mean(&monthly)?;
    Ok(FinancialReport {
        totals: calculate_totals(txns)?,
        by_category: expenses_by_category(txns)?,
        monthly,
        monthly_average,
    })
}
