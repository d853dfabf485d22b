//! finbot-core: message grammar, transaction types and the ledger row layout

pub mod error;
pub mod ledger;
pub mod normalize;
pub mod parser;
pub mod time;
pub mod transaction;

pub use error::{CoreError, Result};
pub use ledger::{LedgerRow, RowError, COLUMN_COUNT, CREDIT_HEADER, HEADERS};
pub use normalize::normalize_label;
pub use parser::{parse_amount, TransactionParser};
pub use transaction::{Expense, Transaction, TransactionKind};
