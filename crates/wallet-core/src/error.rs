use thiserror::Error;

/// BIP-39 mnemonic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    #[error("invalid word count {0}: must be a non-zero multiple of 3, at most 768")]
    InvalidWordCount(usize),

    #[error("unknown word {word:?} at position {position}")]
    UnknownWord { word: String, position: usize },

    #[error("invalid entropy length {0} bytes: must be a non-zero multiple of 4, at most 1024")]
    InvalidEntropyLength(usize),

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    #[error("word list integrity check failed: {0}")]
    WordlistIntegrity(String),

    #[error("a passphrase is required")]
    PassphraseRequired,
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Key error: {0}")]
    Key(#[from] chain_tezos::TezosError),

    #[error("Node error: {0}")]
    Rpc(#[from] tezos_rpc::RpcError),

    #[error("Secret storage failed: {0}")]
    Crypto(#[from] crypto_utils::CryptoError),
}
