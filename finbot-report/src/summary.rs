//! Aggregate figures over the whole ledger, rendered as a Telegram message.

use chrono::NaiveDate;
use finbot_core::LedgerRow;
use finbot_core::time::format_date;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Shown in place of a name when there are no expenses.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub credit_count: usize,
    pub debit_count: usize,
    /// Earliest and latest row dates.
    pub period: Option<(NaiveDate, NaiveDate)>,
    /// Payer with the largest summed expense.
    pub top_spender: Option<(String, Decimal)>,
    /// Most frequent category among expense rows.
    pub top_category: Option<String>,
}

impl Summary {
    pub fn from_rows(rows: &[LedgerRow]) -> Self {
        let total_credits: Decimal = rows.iter().map(LedgerRow::credit_value).sum();
        let total_debits: Decimal = rows.iter().map(LedgerRow::debit).sum();

        let debits: Vec<&LedgerRow> = rows.iter().filter(|r| r.is_debit()).collect();

        let period = rows
            .iter()
            .map(LedgerRow::date)
            .min()
            .zip(rows.iter().map(LedgerRow::date).max());

        Self {
            total_credits,
            total_debits,
            balance: total_credits - total_debits,
            transaction_count: rows.len(),
            credit_count: rows.iter().filter(|r| r.is_credit()).count(),
            debit_count: debits.len(),
            period,
            top_spender: top_spender(&debits),
            top_category: top_category(&debits),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Telegram (legacy) Markdown text.
    pub fn to_markdown(&self) -> String {
        let period = match self.period {
            Some((start, end)) => format!("{} a {}", format_date(&start), format_date(&end)),
            None => "-".to_string(),
        };
        let (spender, spent) = match &self.top_spender {
            Some((name, value)) => (escape_markdown(name), *value),
            None => (NOT_AVAILABLE.to_string(), Decimal::ZERO),
        };
        let category = self
            .top_category
            .as_deref()
            .map(escape_markdown)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        format!(
            "📊 *RESUMO FINANCEIRO*\n\
             \n\
             💰 *Total de créditos*: R$ {:.2} ({} transações)\n\
             💸 *Total de débitos*: R$ {:.2} ({} transações)\n\
             💳 *Saldo atual*: R$ {:.2}\n\
             📊 *Total de transações*: {}\n\
             📅 *Período*: {}\n\
             \n\
             👤 *Maior gastador*: {} (R$ {:.2})\n\
             🏷️ *Categoria mais frequente*: {}\n",
            self.total_credits,
            self.credit_count,
            self.total_debits,
            self.debit_count,
            self.balance,
            self.transaction_count,
            period,
            spender,
            spent,
            category,
        )
    }
}

/// Ties go to the first payer in sorted order.
fn top_spender(debits: &[&LedgerRow]) -> Option<(String, Decimal)> {
    let mut by_payer: BTreeMap<&str, Decimal> = BTreeMap::new();
    for row in debits {
        *by_payer.entry(row.payer.as_str()).or_default() += row.debit();
    }
    by_payer
        .into_iter()
        .fold(None, |best: Option<(&str, Decimal)>, (payer, total)| match best {
            Some((_, top)) if top >= total => best,
            _ => Some((payer, total)),
        })
        .map(|(payer, total)| (payer.to_string(), total))
}

/// Ties go to the lexicographically smallest category.
fn top_category(debits: &[&LedgerRow]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in debits {
        *counts.entry(row.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (category, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((category, n)),
        })
        .map(|(category, _)| category.to_string())
}

/// Escape the characters legacy Markdown treats as entity delimiters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
