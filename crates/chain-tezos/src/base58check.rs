//! Base58Check encoding with Tezos prefix framing.
//!
//! Layout of the encoded bytes: `prefix || payload || checksum`, where the
//! checksum is the first four bytes of SHA-256(SHA-256(prefix || payload)).
//! The alphabet conversion is delegated to `bs58`, which keeps one leading
//! `1` per leading zero byte. The checksum is computed and verified here on
//! every call, independently of any checks made by the node.
//!
//! Base conversion is quadratic in the input length. That is fine for keys,
//! hashes and signatures (at most a few hundred bytes); do not use this codec
//! for bulk data.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::CodecError;

/// Number of checksum bytes appended before base-58 conversion.
pub const CHECKSUM_LEN: usize = 4;

/// Encodes `payload` behind `prefix` (which may be empty) as Base58Check text.
///
/// The framed copy of the payload is wiped before returning, so secret keys
/// can be encoded without leaving raw bytes behind.
pub fn encode(payload: &[u8], prefix: &[u8]) -> String {
    let mut framed = Zeroizing::new(Vec::with_capacity(prefix.len() + payload.len() + CHECKSUM_LEN));
    framed.extend_from_slice(prefix);
    framed.extend_from_slice(payload);

    let checksum = double_sha256_checksum(&framed);
    framed.extend_from_slice(&checksum);

    bs58::encode(&framed[..]).into_string()
}

/// Decodes Base58Check `text`, verifies its checksum and strips exactly
/// `prefix.len()` leading bytes.
///
/// The stripped bytes are not compared against `prefix`; callers that need a
/// typed check should decode with the prefix they expect and validate the
/// payload length.
pub fn decode(text: &str, prefix: &[u8]) -> Result<Vec<u8>, CodecError> {
    let framed = bs58::decode(text)
        .into_vec()
        .map_err(|e| map_decode_error(text, e))?;

    if framed.len() < CHECKSUM_LEN {
        return Err(CodecError::MissingChecksum);
    }

    let (body, checksum) = framed.split_at(framed.len() - CHECKSUM_LEN);
    if checksum != double_sha256_checksum(body) {
        return Err(CodecError::ChecksumMismatch);
    }

    if body.len() < prefix.len() {
        return Err(CodecError::MalformedPrefix {
            expected: prefix.len(),
            actual: body.len(),
        });
    }

    Ok(body[prefix.len()..].to_vec())
}

/// Double SHA-256 checksum (first 4 bytes).
fn double_sha256_checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&second[..CHECKSUM_LEN]);
    checksum
}

fn map_decode_error(text: &str, error: bs58::decode::Error) -> CodecError {
    match error {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            CodecError::InvalidCharacter { character, index }
        }
        bs58::decode::Error::NonAsciiCharacter { index } => CodecError::InvalidCharacter {
            character: text
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            index,
        },
        // into_vec sizes its own buffer and no checksum mode is enabled on
        // the bs58 side, so nothing else is reachable.
        _ => CodecError::ChecksumMismatch,
    }
}
