//! tz1 address derivation and validation.
//!
//! A tz1 address is the Base58Check encoding, under the [`prefix::TZ1`] tag,
//! of the 20-byte Blake2b hash of a 32-byte Ed25519 public key.

use crate::base58check;
use crate::hash::public_key_hash;
use crate::prefix;

/// Derive the tz1 address of an Ed25519 public key.
pub fn address_from_public_key(public_key: &[u8; 32]) -> String {
    base58check::encode(&public_key_hash(public_key), prefix::TZ1)
}

/// Returns `true` iff `text` decodes as Base58Check under the tz1 prefix.
///
/// Never fails: any decode error (bad character, checksum, too short) yields
/// `false`.
pub fn check_address(text: &str) -> bool {
    base58check::decode(text, prefix::TZ1).is_ok()
}
