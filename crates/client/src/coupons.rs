//! Loading the coupon catalogue from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use quickbite_core::{CouponBook, CouponBookError};

/// Errors loading a coupon file.
#[derive(Debug, Error)]
pub enum CouponFileError {
    #[error("Failed to read coupon file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid coupon file: {0}")]
    Parse(#[from] CouponBookError),
}

/// Read a coupon book from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid
/// coupon list.
#[instrument(fields(path = %path.display()))]
pub async fn load_coupon_book(path: &Path) -> Result<CouponBook, CouponFileError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CouponFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let book = CouponBook::from_json(&json)?;
    info!(coupons = book.len(), "Loaded coupon book");
    Ok(book)
}

/// Read the configured coupon book, or an empty book when none is configured.
///
/// # Errors
///
/// Returns an error if a file is configured but cannot be loaded.
pub async fn load_configured(path: Option<&Path>) -> Result<CouponBook, CouponFileError> {
    match path {
        Some(path) => load_coupon_book(path).await,
        None => Ok(CouponBook::default()),
    }
}
