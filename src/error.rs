use thiserror::Error;

pub type Result<T> = std::result::Result<T, CryptoError>;

/// Every failure the library reports.
///
/// `Verification` carries no detail about what failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CryptoError {
    #[error("crypto can't initialize: {0}")]
    Init(&'static str),

    #[error("crypto wrong size: expected {expected}, got {actual}")]
    Size { expected: usize, actual: usize },

    #[error("crypto input format error")]
    Format,

    #[error("crypto can't set memory properties ({0})")]
    Lock(&'static str),

    #[error("crypto can't generate key pair")]
    KeyGen,

    #[error("crypto overflow incrementing nonce")]
    Overflow,

    #[error("crypto verification error")]
    Verification,

    #[error("crypto not enough memory")]
    OutOfMemory,

    #[error("crypto backend refused the request: {0}")]
    Backend(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    /// Shorthand for a length mismatch.
    pub(crate) fn size(expected: usize, actual: usize) -> Self {
        Self::Size { expected, actual }
    }
}

/// Fail with a size error unless `actual == expected`.
pub(crate) fn check_size(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CryptoError::size(expected, actual))
    }
}
