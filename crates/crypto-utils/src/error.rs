use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("sealing failed: {0}")]
    SealFailed(String),

    #[error("unsealing failed: {0}")]
    UnsealFailed(String),

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
