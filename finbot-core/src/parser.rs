//! Chat message grammar.
//!
//! Two line shapes are recognized, tried in this order:
//!
//!   <amount> - credito
//!   <amount> - <payment method> - <category> (<description>) - <payer>
//!
//! `<amount>` is digits with an optional `.` or `,` and one or two decimals.
//! Anything else is "no match", which callers answer with a usage hint.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::transaction::{Expense, Transaction};

/// Compiled message patterns. Build once and share.
#[derive(Debug, Clone)]
pub struct TransactionParser {
    credit_re: Regex,
    expense_re: Regex,
}

impl TransactionParser {
    pub fn new() -> Result<Self> {
        let credit_re = Regex::new(r"(?i)^(?P<amount>\d+(?:[.,]\d{1,2})?)\s*-\s*credito\s*$")?;

        let expense_re = Regex::new(concat!(
            r"(?i)^(?P<amount>\d+(?:[.,]\d{1,2})?)\s*-\s*",
            r"(?P<method>[^-]+?)\s*-\s*",
            r"(?P<category>[^-()]+?)\s*",
            r"\((?P<description>[^)]+)\)\s*-\s*",
            r"(?P<payer>.+?)$"
        ))?;

        Ok(Self {
            credit_re,
            expense_re,
        })
    }

    /// Parse one chat line. Returns `None` when neither shape matches, when
    /// the amount does not parse or is zero, or when any expense field is
    /// blank after trimming.
    pub fn parse(&self, line: &str) -> Option<Transaction> {
        let line = line.trim();

        // Credit first: "<n> - credito" must never be read as an expense.
        if let Some(caps) = self.credit_re.captures(line) {
            let amount = parse_amount(&caps["amount"])?;
            return Some(Transaction::Credit { amount });
        }

        let caps = self.expense_re.captures(line)?;
        let amount = parse_amount(&caps["amount"])?;

        let payment_method = caps["method"].trim();
        let category = caps["category"].trim();
        let description = caps["description"].trim();
        let payer = caps["payer"].trim();

        if [payment_method, category, description, payer]
            .iter()
            .any(|f| f.is_empty())
        {
            return None;
        }

        Some(Transaction::Expense(Expense::new(
            amount,
            payment_method,
            category,
            description,
            payer,
        )))
    }
}

/// Parse a message amount, accepting a decimal comma.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(&raw.trim().replace(',', ".")).ok()?;
    if value <= Decimal::ZERO {
        return None;
    }
    Some(value.round_dp(2))
}
