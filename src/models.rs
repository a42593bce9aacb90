use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction direction after type coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxnType {
    /// Income. Canonical value is non-negative.
    Entrada,
    /// Expense. Canonical value is non-positive.
    Saida,
    /// Anything outside the known set, kept verbatim.
    Other(String),
}

impl TxnType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Entrada => "entrada",
            Self::Saida => "saida",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// The cell was null. Never a reason to drop or reject a row.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Other(s) if s.is_empty())
    }
}

impl From<String> for TxnType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "entrada" => Self::Entrada,
            "saida" => Self::Saida,
            _ => Self::Other(s),
        }
    }
}

impl From<TxnType> for String {
    fn from(t: TxnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned ledger row, as read back from the cleaned CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TxnType,
    pub value: Decimal,
    pub category: String,
}

/// A cleaned row plus the non-canonical columns carried through from the raw file.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub txn: Transaction,
    pub extras: Vec<String>,
}

/// Raw table as loaded from disk. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawFrame {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Borrow one column top to bottom.
    pub fn column<'a>(&'a self, idx: usize) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |r| r[idx].as_str())
    }
}
