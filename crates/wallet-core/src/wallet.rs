//! Wallet façade: one tz1 identity, the secrets it came from, and the
//! node operations it can authorize.

use std::fmt;

use chain_tezos::signing::{sign, SignedMessage, Watermark};
use chain_tezos::KeyMaterial;
use crypto_utils::random::random_secret;
use crypto_utils::SecretBuffer;
use secrecy::SecretString;
use tezos_rpc::{MicroTez, OperationLimits, Rpc, Submission, Transport};
use tracing::info;

use crate::error::{MnemonicError, WalletError};
use crate::mnemonic::{mnemonic_to_seed, split_phrase, Wordlist};

/// Words in a wallet mnemonic.
pub const MNEMONIC_WORD_COUNT: usize = 15;

/// Bytes of the stretched seed kept as the Ed25519 seed.
pub const WALLET_SEED_LEN: usize = 32;

pub struct Wallet {
    keys: KeyMaterial,
    seed: SecretBuffer,
    mnemonic: Option<SecretString>,
    passphrase: Option<SecretString>,
}

impl Wallet {
    /// Wallet over a random 32-byte seed, with no mnemonic.
    pub fn generate() -> Result<Self, WalletError> {
        let seed = random_secret(WALLET_SEED_LEN);
        Self::from_seed(seed.expose())
    }

    /// Wallet over a freshly generated 15-word mnemonic.
    pub fn generate_with_passphrase(wordlist: &Wordlist, passphrase: &str) -> Result<Self, WalletError> {
        let words = wordlist.generate_mnemonic()?;
        Self::from_words(wordlist, &words, passphrase)
    }

    /// Wallet from a space-separated 15-word phrase.
    pub fn from_mnemonic(wordlist: &Wordlist, phrase: &str, passphrase: &str) -> Result<Self, WalletError> {
        Self::from_words(wordlist, &split_phrase(phrase), passphrase)
    }

    /// Wallet from a fundraiser phrase; the passphrase is `email` followed by
    /// `password`.
    pub fn from_fundraiser(
        wordlist: &Wordlist,
        phrase: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, WalletError> {
        let passphrase = zeroize::Zeroizing::new(format!("{email}{password}"));
        Self::from_mnemonic(wordlist, phrase, &passphrase)
    }

    /// Wallet from 15 words.
    ///
    /// The words must be in `wordlist` and carry a valid checksum. The
    /// passphrase must not be blank. The seed is the first 32 bytes of the
    /// stretched mnemonic.
    pub fn from_words<S: AsRef<str>>(
        wordlist: &Wordlist,
        words: &[S],
        passphrase: &str,
    ) -> Result<Self, WalletError> {
        if words.len() != MNEMONIC_WORD_COUNT {
            return Err(WalletError::InvalidMnemonic(format!(
                "expected {MNEMONIC_WORD_COUNT} words, got {}",
                words.len()
            )));
        }
        if passphrase.trim().is_empty() {
            return Err(MnemonicError::PassphraseRequired.into());
        }

        // Checksum and dictionary check only; the entropy itself is unused.
        wordlist.mnemonic_to_entropy(words)?;

        let stretched = mnemonic_to_seed(words, passphrase)?;
        let mut wallet = Self::from_seed(&stretched.expose()[..WALLET_SEED_LEN])?;

        let phrase = words.iter().map(|w| w.as_ref()).collect::<Vec<&str>>().join(" ");
        wallet.mnemonic = Some(SecretString::from(phrase));
        wallet.passphrase = Some(SecretString::from(passphrase));

        Ok(wallet)
    }

    /// Wallet from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() != WALLET_SEED_LEN {
            return Err(WalletError::InvalidSeed(format!(
                "expected {WALLET_SEED_LEN} bytes, got {}",
                seed.len()
            )));
        }

        let keys = KeyMaterial::from_seed(seed)?;
        info!(address = keys.address(), "wallet opened");

        Ok(Self {
            keys,
            seed: SecretBuffer::new(seed.to_vec()),
            mnemonic: None,
            passphrase: None,
        })
    }

    pub fn address(&self) -> &str {
        self.keys.address()
    }

    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// The `edpk…` public key.
    pub fn public_key(&self) -> Result<String, WalletError> {
        Ok(self.keys.encoded_public_key()?)
    }

    pub fn seed(&self) -> &SecretBuffer {
        &self.seed
    }

    /// The phrase this wallet was built from, if any.
    pub fn mnemonic(&self) -> Option<&SecretString> {
        self.mnemonic.as_ref()
    }

    pub fn passphrase(&self) -> Option<&SecretString> {
        self.passphrase.as_ref()
    }

    /// Sign a hex message with this wallet's key.
    pub fn sign(&self, hex_message: &str, watermark: Option<Watermark>) -> Result<SignedMessage, WalletError> {
        Ok(sign(hex_message, &self.keys, watermark)?)
    }

    // ─── Node operations ───────────────────────────────────────────

    /// Activate this wallet's fundraiser account with its activation code.
    pub async fn activate<T: Transport>(&self, rpc: &Rpc<T>, code: &str) -> Result<Submission, WalletError> {
        Ok(rpc.activate(self.address(), code).await?)
    }

    pub async fn balance<T: Transport>(&self, rpc: &Rpc<T>) -> Result<MicroTez, WalletError> {
        Ok(rpc.balance(self.address()).await?)
    }

    /// Send `amount` to `to`, revealing this account first if needed.
    pub async fn transfer<T: Transport>(
        &self,
        rpc: &Rpc<T>,
        to: &str,
        amount: MicroTez,
        fee: MicroTez,
        limits: OperationLimits,
    ) -> Result<Submission, WalletError> {
        Ok(rpc
            .send_transaction(&self.keys, self.address(), to, amount, fee, limits)
            .await?)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.keys.address())
            .field("has_mnemonic", &self.mnemonic.is_some())
            .finish_non_exhaustive()
    }
}
