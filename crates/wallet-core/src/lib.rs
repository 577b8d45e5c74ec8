//! # wallet-core
//!
//! tz1 wallet built on the lower crates: BIP-39 mnemonics, key derivation,
//! signing, and node operations through `tezos-rpc`.

pub mod error;
pub mod mnemonic;
pub mod wallet;

pub use chain_tezos::{check_address, KeyMaterial, SignedMessage, Watermark};
pub use error::{MnemonicError, WalletError};
pub use mnemonic::{mnemonic_to_seed, Wordlist};
pub use tezos_rpc::{Chain, MicroTez, OperationLimits, Rpc, RpcConfig, Submission};
pub use wallet::Wallet;

// ─── Convenience functions ───────────────────────────────────────────

/// Generate a new 15-word mnemonic as one space-separated phrase.
pub fn generate_mnemonic(wordlist: &Wordlist) -> Result<String, WalletError> {
    Ok(wordlist.generate_mnemonic()?.join(" "))
}

/// Whether `phrase` is a well-formed mnemonic: known words, valid word count
/// and checksum.
pub fn validate_mnemonic(wordlist: &Wordlist, phrase: &str) -> bool {
    wordlist
        .mnemonic_to_entropy(&mnemonic::split_phrase(phrase))
        .is_ok()
}

/// Check a single word against the dictionary, for autocomplete.
pub fn is_valid_word(wordlist: &Wordlist, word: &str) -> bool {
    wordlist.contains(word)
}

/// Derive the tz1 address for a mnemonic and passphrase without keeping the
/// wallet around.
pub fn derive_address_from_mnemonic(
    wordlist: &Wordlist,
    phrase: &str,
    passphrase: &str,
) -> Result<String, WalletError> {
    let wallet = Wallet::from_mnemonic(wordlist, phrase, passphrase)?;
    Ok(wallet.address().to_string())
}

/// Verify `signature` over the raw bytes of `hex_message` against an
/// `edpk…` key.
pub fn verify_signature(hex_message: &str, signature: &[u8], public_key: &str) -> Result<bool, WalletError> {
    Ok(chain_tezos::verify(hex_message, signature, public_key)?)
}
