//! Base58Check prefixes and their byte sequences.
//!
//! Each prefix is chosen so that the encoded text starts with a fixed, human
//! readable tag (`tz1…`, `edpk…`, `edsig…`). They are protocol constants.

/// Ed25519 public key hash (`tz1`).
pub const TZ1: &[u8] = &[6, 161, 159];
/// Secp256k1 public key hash (`tz2`).
pub const TZ2: &[u8] = &[6, 161, 161];
/// P-256 public key hash (`tz3`).
pub const TZ3: &[u8] = &[6, 161, 164];
/// Originated contract (`KT1`).
pub const KT1: &[u8] = &[2, 90, 121];

/// Ed25519 public key (`edpk`).
pub const EDPK: &[u8] = &[13, 15, 37, 217];
/// Ed25519 secret key, 64-byte seed+public form (`edsk`).
pub const EDSK: &[u8] = &[43, 246, 78, 7];
/// Ed25519 signature (`edsig`).
pub const EDSIG: &[u8] = &[9, 245, 205, 134, 18];

/// Block hash (`B`).
pub const BLOCK_HASH: &[u8] = &[1, 52];
/// Operation hash (`o`).
pub const OPERATION_HASH: &[u8] = &[5, 116];
/// Protocol hash (`P`).
pub const PROTOCOL_HASH: &[u8] = &[2, 170];
/// Chain id (`Net`).
pub const CHAIN_ID: &[u8] = &[87, 82, 0];
