//! tz1 key material: seed to Ed25519 key pair, and sealed storage of the
//! resulting keys.
//!
//! Raw key bytes only exist in memory for as long as a derivation or a
//! `with_*` closure runs. Everything held by [`KeyMaterial`] is sealed with
//! [`ProtectedBytes`], and every intermediate buffer is zeroized on every exit
//! path.

use std::fmt;

use crypto_utils::{ProtectedBytes, SecretBuffer};
use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, Zeroizing};

use crate::address::address_from_public_key;
use crate::base58check;
use crate::error::TezosError;
use crate::prefix;

/// Ed25519 seed length in bytes.
pub const SEED_LEN: usize = 32;
/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Secret key length in bytes: `seed || public_key`.
pub const SECRET_KEY_LEN: usize = 64;

/// Derive the Ed25519 key pair for a 32-byte seed.
///
/// Deterministic: the same seed always yields the same pair. The secret key
/// is the 64-byte `seed || public_key` form used by `edsk` keys, returned in
/// a buffer that wipes itself on drop.
pub fn derive_key_pair(seed: &[u8; SEED_LEN]) -> ([u8; PUBLIC_KEY_LEN], SecretBuffer) {
    // SigningKey zeroizes its own copy of the seed on drop.
    let signing_key = SigningKey::from_bytes(seed);
    let public_key = signing_key.verifying_key().to_bytes();

    let mut keypair = signing_key.to_keypair_bytes();
    let secret_key = SecretBuffer::take_from(&mut keypair);

    (public_key, secret_key)
}

/// A tz1 identity: public key, secret key and derived address.
///
/// Built once per wallet and immutable afterwards. Both keys are sealed;
/// read them through [`KeyMaterial::with_secret_key`] and
/// [`KeyMaterial::with_public_key`], which lend the raw bytes for the
/// duration of a closure only.
pub struct KeyMaterial {
    public_key: ProtectedBytes,
    secret_key: ProtectedBytes,
    address: String,
}

impl KeyMaterial {
    /// Derive the key material for a 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, TezosError> {
        let seed = Zeroizing::new(<[u8; SEED_LEN]>::try_from(seed).map_err(|_| {
            TezosError::InvalidSeed(format!("expected {SEED_LEN} bytes, got {}", seed.len()))
        })?);

        let (mut public_key, mut secret_key) = derive_key_pair(&seed);
        Self::from_key_pair(&mut public_key, secret_key.expose_mut())
    }

    /// Build key material from raw key bytes.
    ///
    /// Both input buffers are overwritten with zeros before this returns,
    /// whether construction succeeds or not.
    pub fn from_key_pair(public_key: &mut [u8], secret_key: &mut [u8]) -> Result<Self, TezosError> {
        let result = Self::seal(public_key, secret_key);
        public_key.zeroize();
        secret_key.zeroize();
        result
    }

    fn seal(public_key: &mut [u8], secret_key: &mut [u8]) -> Result<Self, TezosError> {
        let public_array: &[u8; PUBLIC_KEY_LEN] = (&*public_key).try_into().map_err(|_| {
            TezosError::InvalidKey(format!(
                "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
                public_key.len()
            ))
        })?;
        if secret_key.len() != SECRET_KEY_LEN {
            return Err(TezosError::InvalidKey(format!(
                "secret key must be {SECRET_KEY_LEN} bytes, got {}",
                secret_key.len()
            )));
        }

        let address = address_from_public_key(public_array);
        let public_key = ProtectedBytes::seal_and_wipe(public_key)?;
        let secret_key = ProtectedBytes::seal_and_wipe(secret_key)?;

        tracing::debug!(%address, "sealed tz1 key material");

        Ok(Self {
            public_key,
            secret_key,
            address,
        })
    }

    /// The tz1 address of this identity.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Lend the 64-byte secret key to `f`. The unsealed copy is wiped when
    /// `f` returns.
    pub fn with_secret_key<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, TezosError> {
        Ok(self.secret_key.with_exposed(f)?)
    }

    /// Lend the 32-byte public key to `f`.
    pub fn with_public_key<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, TezosError> {
        Ok(self.public_key.with_exposed(f)?)
    }

    /// The `edpk…` text form of the public key, as carried by reveal
    /// operations.
    pub fn encoded_public_key(&self) -> Result<String, TezosError> {
        self.with_public_key(|pk| base58check::encode(pk, prefix::EDPK))
    }

    /// Lend the `edsk…` text form of the secret key to `f`. The text is held
    /// in a zeroizing string and wiped before this returns.
    pub fn with_encoded_secret_key<R>(&self, f: impl FnOnce(&str) -> R) -> Result<R, TezosError> {
        let encoded = self.with_secret_key(|sk| Zeroizing::new(base58check::encode(sk, prefix::EDSK)))?;
        Ok(f(&encoded))
    }

    /// Rebuild the dalek signing key. It wipes itself on drop, so callers
    /// should keep it on the stack of the signing call only.
    pub(crate) fn signing_key(&self) -> Result<SigningKey, TezosError> {
        self.with_secret_key(|sk| {
            let keypair = Zeroizing::new(
                <[u8; SECRET_KEY_LEN]>::try_from(sk)
                    .map_err(|_| TezosError::InvalidKey("sealed secret key has wrong length".into()))?,
            );
            SigningKey::from_keypair_bytes(&keypair)
                .map_err(|e| TezosError::InvalidKey(format!("inconsistent key pair: {e}")))
        })?
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [
        144, 252, 66, 143, 33, 90, 245, 35, 86, 154, 51, 81, 72, 245, 25, 51, 228, 74, 189, 43,
        87, 91, 100, 173, 188, 84, 16, 139, 104, 33, 11, 245,
    ];
    const ADDRESS: &str = "tz1hmK2ru6ism15MxXbnhKWWKGJ6hqWssMc5";
    const EDPK: &str = "edpkuAasC4JJhAP8r6uLt4hrXojaUrwp4Eq5WeazGHXcaCVvtR9Y6Q";
    const EDSK: &str = "edskRvyw6U9hf8npM4kWwbZ29Vh2JfUn3GNHWuhHSXNzZpgUxJUGtX1h846YV8RkKHPcWMFnrCMaDVPDKWr7vb3L7qvkjUfxbf";

    #[test]
    fn seed_derives_known_address() {
        let keys = KeyMaterial::from_seed(&SEED).unwrap();
        assert_eq!(keys.address(), ADDRESS);
    }

    #[test]
    fn seed_derives_known_public_key() {
        let keys = KeyMaterial::from_seed(&SEED).unwrap();
        assert_eq!(keys.encoded_public_key().unwrap(), EDPK);
    }

    #[test]
    fn encoded_secret_key_is_lent_to_closure() {
        let keys = KeyMaterial::from_seed(&SEED).unwrap();
        let seen = keys.with_encoded_secret_key(|sk| sk == EDSK).unwrap();
        assert!(seen);
    }

    #[test]
    fn derivation_is_deterministic() {
        let (pk_a, sk_a) = derive_key_pair(&SEED);
        let (pk_b, sk_b) = derive_key_pair(&SEED);
        assert_eq!(pk_a, pk_b);
        assert_eq!(sk_a.expose(), sk_b.expose());
    }

    #[test]
    fn secret_key_is_seed_then_public_key() {
        let (pk, sk) = derive_key_pair(&SEED);
        assert_eq!(sk.len(), SECRET_KEY_LEN);
        assert_eq!(&sk.expose()[..32], &SEED);
        assert_eq!(&sk.expose()[32..], &pk);
    }

    #[test]
    fn from_key_pair_wipes_inputs() {
        let (mut pk, mut sk) = derive_key_pair(&SEED);
        let keys = KeyMaterial::from_key_pair(&mut pk, sk.expose_mut()).unwrap();

        assert_eq!(pk, [0u8; 32]);
        assert!(sk.expose().iter().all(|&b| b == 0));
        assert_eq!(keys.address(), ADDRESS);
        keys.with_secret_key(|sk| assert_eq!(&sk[..32], &SEED)).unwrap();
    }

    #[test]
    fn from_key_pair_wipes_inputs_on_error() {
        let mut pk = [0xAAu8; 31];
        let mut sk = [0xBBu8; 64];
        let err = KeyMaterial::from_key_pair(&mut pk, &mut sk).unwrap_err();

        assert!(matches!(err, TezosError::InvalidKey(_)));
        assert_eq!(pk, [0u8; 31]);
        assert_eq!(sk, [0u8; 64]);
    }

    #[test]
    fn short_seed_is_rejected() {
        match KeyMaterial::from_seed(&[1u8; 16]) {
            Err(TezosError::InvalidSeed(msg)) => assert!(msg.contains("got 16")),
            other => panic!("expected InvalidSeed, got {:?}", other),
        }
    }

    #[test]
    fn signing_key_matches_public_key() {
        let keys = KeyMaterial::from_seed(&SEED).unwrap();
        let signing_key = keys.signing_key().unwrap();
        keys.with_public_key(|pk| assert_eq!(signing_key.verifying_key().as_bytes(), pk))
            .unwrap();
    }

    #[test]
    fn debug_shows_address_only() {
        let keys = KeyMaterial::from_seed(&SEED).unwrap();
        let debug = format!("{:?}", keys);
        assert!(debug.contains(ADDRESS));
        assert!(!debug.contains("edsk"));
        assert!(!debug.contains("144"));
    }
}
