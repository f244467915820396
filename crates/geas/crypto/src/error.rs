/// Errors from the signing primitives.
///
/// Verification never produces one of these: a signature that cannot be
/// checked is simply invalid.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key format error: {0}")]
    KeyFormat(String),

    #[error("canonical encoding failed: {0}")]
    Canonicalization(#[from] serde_json::Error),

    #[error("invalid digest '{0}': expected sha256:<64 lowercase hex>")]
    InvalidDigest(String),
}
