//! Service-account credential bootstrap.
//!
//! Hosted deployments carry the Google key as a base64 env var; it is
//! decoded, checked and written to disk before the sheets client starts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials are not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("credentials are not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("credentials are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("credentials JSON must be an object")]
    NotAnObject,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decode a base64 credential blob and check that it holds a JSON object.
/// Whitespace (line wrapping from `base64` tools) is ignored.
pub fn decode_credentials(encoded: &str) -> Result<String, CredentialsError> {
    let compact: String = encoded.split_whitespace().collect();
    let bytes = STANDARD.decode(compact)?;
    let text = String::from_utf8(bytes)?;
    validate_json(&text)?;
    Ok(text)
}

/// Decode `encoded` and write it to `path`, creating parent directories.
pub fn write_credentials(encoded: &str, path: &Path) -> Result<(), CredentialsError> {
    let text = decode_credentials(encoded)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| CredentialsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a key file and return its base64 form for deployment settings.
pub fn encode_credentials_file(path: &Path) -> Result<String, CredentialsError> {
    let text = fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    validate_json(&text)?;
    Ok(STANDARD.encode(text.as_bytes()))
}

fn validate_json(text: &str) -> Result<(), CredentialsError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(CredentialsError::NotAnObject);
    }
    Ok(())
}
