use async_trait::async_trait;
use finbot_core::{Expense, LedgerRow, Transaction};
use rust_decimal::Decimal;

use crate::error::Result;

/// Ledger storage abstraction.
/// Implementations: Google Sheets for production, in-memory for tests and local runs.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Write the header row if the sheet is empty, or add the credit column
    /// header to an older six-column sheet.
    async fn ensure_header(&self) -> Result<()>;

    /// Append an expense row stamped with the current local time.
    /// Classification fields are normalized here.
    async fn append_expense(&self, expense: &Expense) -> Result<LedgerRow>;

    async fn append_credit(&self, amount: Decimal) -> Result<LedgerRow>;

    /// Delete every row except the header. Returns the number removed.
    async fn clear_all(&self) -> Result<usize>;

    /// All data rows, in sheet order. Blank and undecodable rows are skipped.
    async fn read_all(&self) -> Result<Vec<LedgerRow>>;

    async fn append(&self, txn: &Transaction) -> Result<LedgerRow> {
        match txn {
            Transaction::Expense(e) => self.append_expense(e).await,
            Transaction::Credit { amount } => self.append_credit(*amount).await,
        }
    }
}
