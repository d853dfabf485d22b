use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
