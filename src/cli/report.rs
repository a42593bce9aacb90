use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::analysis::{build_report, load_clean, FinancialReport};
use crate::error::Result;
use crate::fmt::money;
use crate::settings::Settings;

pub fn format_summary(report: &FinancialReport) -> String {
    let t = &report.totals;
    let mut totals = Table::new();
    totals.set_header(vec!["", "Amount"]);
    totals.add_row(vec![Cell::new("Total income".green().bold()), Cell::new(money(t.total_income))]);
    totals.add_row(vec![Cell::new("Total expenses".red().bold()), Cell::new(money(t.total_expense))]);
    let balance_label = if t.balance >= rust_decimal::Decimal::ZERO {
        "Balance".green().bold()
    } else {
        "Balance".red().bold()
    };
    totals.add_row(vec![Cell::new(balance_label), Cell::new(money(t.balance))]);

    let mut out = format!("Financial Report\n{totals}\n");

    if report.by_category.is_empty() {
        out.push_str("\nNo expenses recorded.\n");
    } else {
        let mut cats = Table::new();
        cats.set_header(vec!["Category", "Amount"]);
        for item in &report.by_category {
            cats.add_row(vec![Cell::new(&item.category), Cell::new(money(item.total))]);
        }
        out.push_str(&format!("\nExpenses by Category\n{cats}\n"));
    }

    let avg = report
        .monthly_average
        .map(money)
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!("\nMonthly average expense: {avg}\n"));
    out
}

pub fn run(settings: &Settings) -> Result<()> {
    let txns = load_clean(&settings.output_path)?;
    let report = build_report(&txns, settings.fill_empty_months)?;
    print!("{}", format_summary(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TxnType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn txn(day: u32, kind: TxnType, cents: i64, category: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            kind,
            value: Decimal::new(cents, 2),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_format_summary_lists_totals_and_categories() {
        let txns = vec![
            txn(1, TxnType::Entrada, 100_050, "salario"),
            txn(2, TxnType::Saida, -20_000, "mercado"),
        ];
        let text = format_summary(&build_report(&txns, false).unwrap());
        assert!(text.contains("R$ 1.000,50"));
        assert!(text.contains("-R$ 200,00"));
        assert!(text.contains("R$ 800,50"));
        assert!(text.contains("mercado"));
        assert!(text.contains("Monthly average expense: R$ 200,00"));
    }

    #[test]
    fn test_format_summary_without_expenses() {
        let txns = vec![txn(1, TxnType::Entrada, 500, "salario")];
        let text = format_summary(&build_report(&txns, false).unwrap());
        assert!(text.contains("No expenses recorded."));
        assert!(text.contains("Monthly average expense: n/a"));
    }
}
