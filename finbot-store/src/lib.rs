//! finbot-store: ledger persistence (Google Sheets or in-memory) and credential bootstrap.

pub mod credentials;
pub mod error;
pub mod memory;
#[cfg(feature = "sheets")]
pub mod sheets;
pub mod store;

pub use credentials::{decode_credentials, encode_credentials_file, write_credentials, CredentialsError};
pub use error::{Result, StoreError};
pub use memory::MemoryLedger;
#[cfg(feature = "sheets")]
pub use sheets::{SheetsConfig, SheetsLedger};
pub use store::LedgerStore;
