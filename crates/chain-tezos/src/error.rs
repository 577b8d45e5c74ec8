use thiserror::Error;

/// Base58Check decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("input too short to carry a checksum")]
    MissingChecksum,

    #[error("payload shorter than prefix: expected at least {expected} bytes, got {actual}")]
    MalformedPrefix { expected: usize, actual: usize },
}

/// Tezos key, signing and encoding errors.
#[derive(Debug, Error)]
pub enum TezosError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("secret storage error: {0}")]
    SecretStorage(#[from] crypto_utils::CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_character() {
        let err = CodecError::InvalidCharacter { character: '0', index: 3 };
        assert_eq!(err.to_string(), "invalid base58 character '0' at index 3");
    }

    #[test]
    fn display_malformed_prefix() {
        let err = CodecError::MalformedPrefix { expected: 3, actual: 1 };
        assert_eq!(
            err.to_string(),
            "payload shorter than prefix: expected at least 3 bytes, got 1"
        );
    }

    #[test]
    fn codec_error_is_transparent() {
        let err: TezosError = CodecError::ChecksumMismatch.into();
        assert_eq!(err.to_string(), "checksum mismatch");
    }

    #[test]
    fn display_signature() {
        let err = TezosError::Signature("bad keypair".into());
        assert_eq!(err.to_string(), "signature error: bad keypair");
    }

    #[test]
    fn debug_format_works() {
        let err = TezosError::InvalidSeed("too short".into());
        assert!(format!("{:?}", err).contains("InvalidSeed"));
    }
}
