//! Ledger rows: the positional sheet layout shared by the store and reports.
//!
//! Columns: timestamp, amount, payment method, category, description,
//! payer, credit. A row written by the bot carries either an amount
//! (expense) or a credit, never both.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::time::{format_timestamp, parse_timestamp};
use crate::transaction::{Expense, Transaction};

pub const COLUMN_COUNT: usize = 7;

/// Header row written to an empty sheet.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Data e Hora",
    "Valor (R$)",
    "Meio de Pagamento",
    "Categoria",
    "Descrição",
    "Usuário",
    "Créditos",
];

/// Header of the credit column, added lazily to older sheets.
pub const CREDIT_HEADER: &str = HEADERS[COLUMN_COUNT - 1];

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("blank row")]
    Blank,

    #[error("unparseable timestamp: {0:?}")]
    BadTimestamp(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub timestamp: NaiveDateTime,
    /// Expense value; `None` when the cell is empty
    pub amount: Option<Decimal>,
    pub payment_method: String,
    pub category: String,
    pub description: String,
    pub payer: String,
    /// Credit value; `None` when the cell is empty
    pub credit: Option<Decimal>,
}

impl LedgerRow {
    /// Expense row with normalized classification fields.
    pub fn from_expense(timestamp: NaiveDateTime, expense: &Expense) -> Self {
        let e = expense.normalized();
        Self {
            timestamp,
            amount: Some(e.amount),
            payment_method: e.payment_method,
            category: e.category,
            description: e.description,
            payer: e.payer,
            credit: None,
        }
    }

    pub fn from_credit(timestamp: NaiveDateTime, amount: Decimal) -> Self {
        Self {
            timestamp,
            amount: None,
            payment_method: String::new(),
            category: String::new(),
            description: String::new(),
            payer: String::new(),
            credit: Some(amount),
        }
    }

    pub fn from_transaction(timestamp: NaiveDateTime, txn: &Transaction) -> Self {
        match txn {
            Transaction::Expense(e) => Self::from_expense(timestamp, e),
            Transaction::Credit { amount } => Self::from_credit(timestamp, *amount),
        }
    }

    /// Expense value, zero when absent.
    pub fn debit(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// Credit value, zero when absent.
    pub fn credit_value(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO)
    }

    pub fn is_debit(&self) -> bool {
        self.debit() > Decimal::ZERO
    }

    pub fn is_credit(&self) -> bool {
        self.credit_value() > Decimal::ZERO
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Cell values in column order, ready for a sheet append.
    pub fn to_cells(&self) -> Vec<Value> {
        vec![
            Value::String(format_timestamp(&self.timestamp)),
            decimal_cell(self.amount),
            Value::String(self.payment_method.clone()),
            Value::String(self.category.clone()),
            Value::String(self.description.clone()),
            Value::String(self.payer.clone()),
            decimal_cell(self.credit),
        ]
    }

    /// Decode a sheet row. Missing trailing cells are treated as empty
    /// (older sheets have no credit column). Amount cells that do not
    /// parse count as zero.
    pub fn from_cells(cells: &[Value]) -> Result<Self, RowError> {
        if cells.iter().all(|c| cell_text(Some(c)).trim().is_empty()) {
            return Err(RowError::Blank);
        }

        let raw_ts = cell_text(cells.first());
        let timestamp = parse_timestamp(&raw_ts).ok_or(RowError::BadTimestamp(raw_ts))?;

        Ok(Self {
            timestamp,
            amount: parse_amount_cell(cells.get(1)),
            payment_method: cell_text(cells.get(2)).trim().to_string(),
            category: cell_text(cells.get(3)).trim().to_string(),
            description: cell_text(cells.get(4)).trim().to_string(),
            payer: cell_text(cells.get(5)).trim().to_string(),
            credit: parse_amount_cell(cells.get(6)),
        })
    }
}

fn decimal_cell(value: Option<Decimal>) -> Value {
    value
        .and_then(|d| d.to_f64())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Text content of a cell as the sheet would display it.
pub fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read a stored amount. Empty cells are `None`; numbers and comma- or
/// period-decimal text are parsed; anything else is zero.
pub fn parse_amount_cell(cell: Option<&Value>) -> Option<Decimal> {
    let value = match cell? {
        Value::Null => return None,
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Decimal::from_str(&s.replace(',', ".")).ok()
        }
        _ => None,
    };
    Some(value.map(|d| d.round_dp(2)).unwrap_or(Decimal::ZERO))
}
