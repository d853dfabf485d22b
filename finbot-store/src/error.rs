use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A call to the spreadsheet service failed.
    #[error("spreadsheet request failed ({op}): {message}")]
    Remote { op: &'static str, message: String },

    #[error("worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("ledger backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn remote(op: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Remote {
            op,
            message: err.to_string(),
        }
    }
}
