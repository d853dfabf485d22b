use async_trait::async_trait;
use chrono_tz::Tz;
use finbot_core::time::local_now;
use finbot_core::{Expense, LedgerRow};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::LedgerStore;

/// In-process ledger. Rows live only as long as the process.
pub struct MemoryLedger {
    tz: Tz,
    rows: RwLock<Vec<LedgerRow>>,
}

impl MemoryLedger {
    pub fn new(tz: Tz) -> Self {
        Self::with_rows(tz, Vec::new())
    }

    /// Start from existing rows (timestamps are kept as given).
    pub fn with_rows(tz: Tz, rows: Vec<LedgerRow>) -> Self {
        Self {
            tz,
            rows: RwLock::new(rows),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn push(&self, row: LedgerRow) -> LedgerRow {
        self.rows.write().await.push(row.clone());
        row
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn ensure_header(&self) -> Result<()> {
        Ok(())
    }

    async fn append_expense(&self, expense: &Expense) -> Result<LedgerRow> {
        let row = LedgerRow::from_expense(local_now(self.tz), expense);
        Ok(self.push(row).await)
    }

    async fn append_credit(&self, amount: Decimal) -> Result<LedgerRow> {
        let row = LedgerRow::from_credit(local_now(self.tz), amount);
        Ok(self.push(row).await)
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut rows = self.rows.write().await;
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }

    async fn read_all(&self) -> Result<Vec<LedgerRow>> {
        Ok(self.rows.read().await.clone())
    }
}
