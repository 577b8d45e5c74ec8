//! Blake2b "generic hash", the chain's general-purpose digest.

/// Size of a public key hash (tz1 payload) in bytes.
pub const PUBLIC_KEY_HASH_LEN: usize = 20;

/// Size of an operation/signing digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Unkeyed Blake2b with an `N`-byte output.
fn blake2b<const N: usize>(data: &[u8]) -> [u8; N] {
    let hash = blake2b_simd::Params::new().hash_length(N).hash(data);
    let mut out = [0u8; N];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// 32-byte digest, the input to Ed25519 operation signing.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    blake2b::<DIGEST_LEN>(data)
}

/// 20-byte digest used for public key hashes.
pub fn public_key_hash(public_key: &[u8]) -> [u8; PUBLIC_KEY_HASH_LEN] {
    blake2b::<PUBLIC_KEY_HASH_LEN>(public_key)
}
