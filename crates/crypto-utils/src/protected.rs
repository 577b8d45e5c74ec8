use std::fmt;

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, KeyInit, Nonce};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::random::fill_random;
use crate::zeroizing::SecretBuffer;

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// AES-256-GCM authentication tag size in bytes.
const TAG_SIZE: usize = 16;

/// Sealing key size in bytes.
const KEY_SIZE: usize = 32;

/// Secret bytes held sealed in memory.
///
/// The plaintext is encrypted with AES-256-GCM under a random key generated
/// for this value alone, so the raw secret never sits in memory between uses.
/// The only read path is [`ProtectedBytes::with_exposed`], which unseals into
/// a [`SecretBuffer`] that is wiped when the closure returns or unwinds.
pub struct ProtectedBytes {
    key: SecretBuffer,
    sealed: Vec<u8>,
}

impl ProtectedBytes {
    /// Seals a copy of `plaintext`. The caller keeps ownership of the input
    /// and is responsible for wiping it.
    pub fn seal(plaintext: &[u8]) -> Result<Self, CryptoError> {
        let mut key = SecretBuffer::zeroed(KEY_SIZE);
        fill_random(key.expose_mut());

        let sealed = encrypt(plaintext, key.expose())?;
        Ok(Self { key, sealed })
    }

    /// Seals `plaintext` and then overwrites it with zeros, on success and on
    /// failure alike.
    pub fn seal_and_wipe(plaintext: &mut [u8]) -> Result<Self, CryptoError> {
        let result = Self::seal(plaintext);
        plaintext.zeroize();
        result
    }

    /// Unseals into a transient buffer and lends it to `f`.
    ///
    /// The buffer is erased before this function returns, whichever way `f`
    /// exits. `f` must not copy the slice into anything that outlives the call.
    pub fn with_exposed<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, CryptoError> {
        let plaintext = SecretBuffer::new(decrypt(&self.sealed, self.key.expose())?);
        Ok(f(plaintext.expose()))
    }

    /// Length of the protected plaintext in bytes.
    pub fn len(&self) -> usize {
        self.sealed.len().saturating_sub(NONCE_SIZE + TAG_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ProtectedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectedBytes([SEALED; {} bytes])", self.len())
    }
}

/// Encrypts `plaintext` with AES-256-GCM.
///
/// The returned vector has the layout `[nonce (12 bytes) | ciphertext + tag]`.
fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidInput(format!("sealing key must be {KEY_SIZE} bytes")))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Reverses [`encrypt`].
fn decrypt(sealed: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "sealed blob too short: expected at least {} bytes, got {}",
            NONCE_SIZE + TAG_SIZE,
            sealed.len()
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidInput(format!("sealing key must be {KEY_SIZE} bytes")))?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| CryptoError::UnsealFailed(e.to_string()))
}
