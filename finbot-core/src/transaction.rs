//! Transaction types produced by the message parser

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_label;

/// Transaction kind, as recognized from a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "credit")]
    Credit,
}

impl TransactionKind {
    /// Portuguese label used in replies
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "Despesa",
            TransactionKind::Credit => "Crédito",
        }
    }
}

/// An outgoing payment with its classification fields.
///
/// Fields are trimmed but not normalized; see [`Expense::normalized`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub amount: Decimal,
    pub payment_method: String,
    pub category: String,
    /// Free text, kept verbatim
    pub description: String,
    pub payer: String,
}

impl Expense {
    pub fn new(
        amount: Decimal,
        payment_method: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        payer: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            payment_method: payment_method.into(),
            category: category.into(),
            description: description.into(),
            payer: payer.into(),
        }
    }

    /// Copy with payment method, category and payer normalized for storage.
    /// The description is left untouched.
    pub fn normalized(&self) -> Self {
        Self {
            amount: self.amount,
            payment_method: normalize_label(&self.payment_method),
            category: normalize_label(&self.category),
            description: self.description.clone(),
            payer: normalize_label(&self.payer),
        }
    }
}

/// A parsed chat transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transaction {
    Expense(Expense),
    Credit { amount: Decimal },
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Expense(_) => TransactionKind::Expense,
            Transaction::Credit { .. } => TransactionKind::Credit,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Transaction::Expense(e) => e.amount,
            Transaction::Credit { amount } => *amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_expense_normalized_keeps_description() {
        let e = Expense::new(
            dec("100.50"),
            "Cartão Visa",
            "Alimentação ",
            "Pão  de queijo",
            " Maria Clara",
        );
        let n = e.normalized();
        assert_eq!(n.payment_method, "cartãovisa");
        assert_eq!(n.category, "alimentação");
        assert_eq!(n.payer, "mariaclara");
        assert_eq!(n.description, "Pão  de queijo");
        assert_eq!(n.amount, dec("100.50"));
    }

    #[test]
    fn test_transaction_kind_and_amount() {
        let credit = Transaction::Credit { amount: dec("1500") };
        assert_eq!(credit.kind(), TransactionKind::Credit);
        assert_eq!(credit.amount(), dec("1500"));

        let expense = Transaction::Expense(Expense::new(dec("5"), "pix", "lazer", "cinema", "ana"));
        assert_eq!(expense.kind(), TransactionKind::Expense);
        assert_eq!(expense.kind().label(), "Despesa");
    }
}
