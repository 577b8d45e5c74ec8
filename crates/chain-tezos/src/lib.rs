//! Tezos identity and signing primitives for the wallet.
//!
//! Covers the Base58Check codec with the chain's typed prefixes, tz1
//! (Ed25519) key material held in sealed storage, and the watermarked
//! Blake2b-then-Ed25519 signing scheme used to authorize operations.

pub mod address;
pub mod base58check;
pub mod error;
pub mod hash;
pub mod keys;
pub mod prefix;
pub mod signing;

// Re-export key public types for ergonomic imports.
pub use address::{address_from_public_key, check_address};
pub use error::{CodecError, TezosError};
pub use keys::{derive_key_pair, KeyMaterial};
pub use signing::{sign, verify, SignedMessage, Watermark, PLACEHOLDER_SIGNATURE};
