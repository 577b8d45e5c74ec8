//! BIP-39 mnemonic engine: entropy to words and back with checksum
//! verification, and mnemonic + passphrase to seed stretching.
//!
//! The dictionary is an explicit [`Wordlist`] value, checked against a
//! SHA-256 digest when built and passed by reference to whatever needs it.

use std::fmt;

use crypto_utils::kdf::pbkdf2_sha512;
use crypto_utils::random::random_secret;
use crypto_utils::SecretBuffer;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{MnemonicError, WalletError};

/// Number of words in a BIP-39 dictionary.
pub const WORDLIST_LEN: usize = 2048;

/// SHA-256 of the English list, words concatenated without separators.
pub const ENGLISH_SHA256: &str = "ad90bf3beb7b0eb7e5acd74727dc0da96e0a280a258354e7293fb7e211ac03db";

/// PBKDF2 rounds for seed stretching.
pub const SEED_ROUNDS: u32 = 2048;

/// Entropy drawn for a freshly generated mnemonic: 160 bits, 15 words.
pub const GENERATED_ENTROPY_LEN: usize = 20;

/// Largest entropy whose checksum still fits in one SHA-256 digest.
const MAX_ENTROPY_LEN: usize = 1024;

/// Word count for [`MAX_ENTROPY_LEN`] bytes of entropy plus checksum.
const MAX_WORD_COUNT: usize = MAX_ENTROPY_LEN * 8 * 33 / 32 / BITS_PER_WORD;

const BITS_PER_WORD: usize = 11;

/// A verified, sorted BIP-39 dictionary.
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    /// The English dictionary, verified against [`ENGLISH_SHA256`].
    pub fn english() -> Result<Self, MnemonicError> {
        Self::from_words(bip39::Language::English.word_list().iter(), ENGLISH_SHA256)
    }

    /// Build a dictionary from `words`, which must be exactly 2048 strictly
    /// sorted entries whose concatenation hashes to `expected_sha256` (hex).
    pub fn from_words<I, S>(words: I, expected_sha256: &str) -> Result<Self, MnemonicError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words.into_iter().map(|w| w.as_ref().to_string()).collect();

        if words.len() != WORDLIST_LEN {
            return Err(MnemonicError::WordlistIntegrity(format!(
                "expected {WORDLIST_LEN} words, got {}",
                words.len()
            )));
        }
        if words.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MnemonicError::WordlistIntegrity("words are not sorted".into()));
        }

        let mut hasher = Sha256::new();
        for word in &words {
            hasher.update(word.as_bytes());
        }
        let digest = hex::encode(hasher.finalize());
        if !digest.eq_ignore_ascii_case(expected_sha256.trim()) {
            return Err(MnemonicError::WordlistIntegrity(format!(
                "digest {digest} does not match expected {expected_sha256}"
            )));
        }

        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index_of(word).is_some()
    }

    fn index_of(&self, word: &str) -> Option<usize> {
        self.words.binary_search_by(|w| w.as_str().cmp(word)).ok()
    }

    /// Encode `entropy` as words.
    ///
    /// The entropy must be a non-zero multiple of 4 bytes, at most 1024. The
    /// first `bits / 32` bits of its SHA-256 are appended as checksum and the
    /// stream is read as 11-bit word indices.
    pub fn entropy_to_mnemonic(&self, entropy: &[u8]) -> Result<Vec<&str>, MnemonicError> {
        if entropy.is_empty() || entropy.len() % 4 != 0 || entropy.len() > MAX_ENTROPY_LEN {
            return Err(MnemonicError::InvalidEntropyLength(entropy.len()));
        }

        let checksum = Sha256::digest(entropy);
        let entropy_bits = entropy.len() * 8;
        let total_bits = entropy_bits + entropy_bits / 32;

        let bit = |i: usize| -> usize {
            if i < entropy_bits {
                read_bit(entropy, i)
            } else {
                read_bit(&checksum, i - entropy_bits)
            }
        };

        let words = (0..total_bits / BITS_PER_WORD)
            .map(|w| {
                let index = (0..BITS_PER_WORD)
                    .fold(0usize, |acc, b| (acc << 1) | bit(w * BITS_PER_WORD + b));
                self.words[index].as_str()
            })
            .collect();

        Ok(words)
    }

    /// Decode words back to entropy, verifying the checksum.
    ///
    /// The word count must be a non-zero multiple of 3, at most 768.
    pub fn mnemonic_to_entropy<S: AsRef<str>>(&self, words: &[S]) -> Result<SecretBuffer, MnemonicError> {
        if words.is_empty() || words.len() % 3 != 0 || words.len() > MAX_WORD_COUNT {
            return Err(MnemonicError::InvalidWordCount(words.len()));
        }

        let total_bits = words.len() * BITS_PER_WORD;
        let mut bits = SecretBuffer::zeroed(total_bits.div_ceil(8));

        for (position, word) in words.iter().enumerate() {
            let word = word.as_ref();
            let index = self.index_of(word).ok_or_else(|| MnemonicError::UnknownWord {
                word: word.to_string(),
                position,
            })?;
            for b in 0..BITS_PER_WORD {
                if (index >> (BITS_PER_WORD - 1 - b)) & 1 == 1 {
                    set_bit(bits.expose_mut(), position * BITS_PER_WORD + b);
                }
            }
        }

        let checksum_bits = total_bits / 33;
        let entropy_bits = total_bits - checksum_bits;
        let entropy = SecretBuffer::new(bits.expose()[..entropy_bits / 8].to_vec());

        let expected = Sha256::digest(entropy.expose());
        let matches = (0..checksum_bits)
            .all(|i| read_bit(bits.expose(), entropy_bits + i) == read_bit(&expected, i));
        if !matches {
            return Err(MnemonicError::ChecksumMismatch);
        }

        Ok(entropy)
    }

    /// Fresh 15-word mnemonic from the OS random source.
    pub fn generate_mnemonic(&self) -> Result<Vec<&str>, MnemonicError> {
        let entropy = random_secret(GENERATED_ENTROPY_LEN);
        self.entropy_to_mnemonic(entropy.expose())
    }
}

impl fmt::Debug for Wordlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wordlist")
            .field("len", &self.words.len())
            .finish_non_exhaustive()
    }
}

/// Stretch a mnemonic into a 64-byte seed.
///
/// PBKDF2-HMAC-SHA512 over the space-joined words, salted with `"mnemonic"`
/// followed by `passphrase`, 2048 rounds. The words are not checked against
/// any dictionary here. An empty passphrase is refused.
pub fn mnemonic_to_seed<S: AsRef<str>>(words: &[S], passphrase: &str) -> Result<SecretBuffer, WalletError> {
    if passphrase.is_empty() {
        return Err(MnemonicError::PassphraseRequired.into());
    }

    let password = Zeroizing::new(
        words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<&str>>()
            .join(" "),
    );
    let salt = Zeroizing::new(format!("mnemonic{passphrase}"));

    Ok(pbkdf2_sha512(password.as_bytes(), salt.as_bytes(), SEED_ROUNDS)?)
}

/// Split a phrase on any run of whitespace.
pub fn split_phrase(phrase: &str) -> Vec<&str> {
    phrase.split_whitespace().collect()
}

fn read_bit(bytes: &[u8], i: usize) -> usize {
    ((bytes[i / 8] >> (7 - i % 8)) & 1) as usize
}

fn set_bit(bytes: &mut [u8], i: usize) {
    bytes[i / 8] |= 1 << (7 - i % 8);
}
