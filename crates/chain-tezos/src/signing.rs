//! Watermarked Blake2b-then-Ed25519 signing.
//!
//! `sign` hashes `watermark || message` to 32 bytes and signs the digest.
//! `verify` checks a signature against the raw message bytes, with no hash
//! and no watermark. The two paths are not inverses of each other: a
//! signature produced by `sign` verifies against the hex of its digest, not
//! against the original message.

use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};

use crate::base58check;
use crate::error::TezosError;
use crate::hash;
use crate::keys::{KeyMaterial, PUBLIC_KEY_LEN};
use crate::prefix;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// `edsig` encoding of an all-zero signature, sent in place of a real one
/// for operations that carry no signer (account activation).
pub const PLACEHOLDER_SIGNATURE: &str =
    "edsigtXomBKi5CTRf5cjATJWSyaRvhfYNHqSUGrn4SdbYRcGwQrUGjzEfQDTuqHhuA8b2d8NarZjz8TRf65WkpQmo423BtomS8Q";

/// Domain-separation tag mixed into the hash before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watermark {
    Block,
    Endorsement,
    /// Operations and arbitrary payloads.
    Generic,
}

impl Watermark {
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Watermark::Block => &[0x01],
            Watermark::Endorsement => &[0x02],
            Watermark::Generic => &[0x03],
        }
    }
}

/// Output of one signing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// The message as given, without the watermark.
    pub payload: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
    /// `edsig…` text of `signature`.
    pub encoded_signature: String,
    /// The message hex exactly as given, followed by `hex(signature)`. This
    /// is the form injected into the chain.
    pub signed_hex: String,
}

impl SignedMessage {
    /// A message carrying the all-zero signature and
    /// [`PLACEHOLDER_SIGNATURE`], for submissions made without key material.
    pub fn unsigned(hex_message: &str) -> Result<Self, TezosError> {
        let payload = decode_hex(hex_message)?;
        let signature = [0u8; SIGNATURE_LEN];
        Ok(Self {
            signed_hex: format!("{hex_message}{}", hex::encode(signature)),
            payload,
            signature,
            encoded_signature: PLACEHOLDER_SIGNATURE.to_string(),
        })
    }

    /// Base58Check text (no prefix) of the 32-byte generic hash of the
    /// payload.
    pub fn payload_hash(&self) -> String {
        base58check::encode(&hash::digest(&self.payload), &[])
    }
}

/// Sign a hex-encoded message with `keys`.
///
/// The watermark, if any, is part of the hash input only. It never appears in
/// [`SignedMessage::payload`] or [`SignedMessage::signed_hex`].
pub fn sign(
    hex_message: &str,
    keys: &KeyMaterial,
    watermark: Option<Watermark>,
) -> Result<SignedMessage, TezosError> {
    let payload = decode_hex(hex_message)?;

    let mut hash_input = Vec::with_capacity(payload.len() + 1);
    if let Some(watermark) = watermark {
        hash_input.extend_from_slice(watermark.as_bytes());
    }
    hash_input.extend_from_slice(&payload);
    let digest = hash::digest(&hash_input);

    let signing_key = keys.signing_key()?;
    let signature = signing_key.sign(&digest).to_bytes();
    drop(signing_key);

    tracing::debug!(
        address = keys.address(),
        payload_len = payload.len(),
        ?watermark,
        "signed message"
    );

    Ok(SignedMessage {
        signed_hex: format!("{hex_message}{}", hex::encode(signature)),
        encoded_signature: base58check::encode(&signature, prefix::EDSIG),
        payload,
        signature,
    })
}

/// Check `signature` over the raw bytes of `hex_message` against an `edpk…`
/// public key.
///
/// Returns `Ok(false)` for a well-formed signature that does not match.
/// Malformed hex, key text or signature length are errors.
pub fn verify(hex_message: &str, signature: &[u8], public_key: &str) -> Result<bool, TezosError> {
    let message = decode_hex(hex_message)?;

    let key_bytes = base58check::decode(public_key, prefix::EDPK)?;
    let key_bytes: [u8; PUBLIC_KEY_LEN] = key_bytes.as_slice().try_into().map_err(|_| {
        TezosError::InvalidKey(format!(
            "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
            key_bytes.len()
        ))
    })?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| TezosError::InvalidKey(format!("not an Ed25519 point: {e}")))?;

    let signature = Signature::from_slice(signature)
        .map_err(|e| TezosError::Signature(format!("malformed signature: {e}")))?;

    Ok(verifying_key.verify(&message, &signature).is_ok())
}

fn decode_hex(hex_message: &str) -> Result<Vec<u8>, TezosError> {
    hex::decode(hex_message).map_err(|e| TezosError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [
        144, 252, 66, 143, 33, 90, 245, 35, 86, 154, 51, 81, 72, 245, 25, 51, 228, 74, 189, 43,
        87, 91, 100, 173, 188, 84, 16, 139, 104, 33, 11, 245,
    ];
    const EDPK: &str = "edpkuAasC4JJhAP8r6uLt4hrXojaUrwp4Eq5WeazGHXcaCVvtR9Y6Q";
    const DEADBEEF_SIG: &str = "edsigu381EJdRqFsQ1ojdTv3b68zpthf4Do3mk1E5mkb8H8due8MqhGzbzWRyHxXZLzuXaUqi6S5TUUZ5iDhm6Kim7DCn6NRDtF";
    const DEADBEEF_DIGEST: &str = "9d1451bf0f87efb30aa0e5b991174e427f047c515e281c5aed58d5e27d280b99";

    fn keys() -> KeyMaterial {
        KeyMaterial::from_seed(&SEED).unwrap()
    }

    #[test]
    fn watermark_bytes() {
        assert_eq!(Watermark::Block.as_bytes(), &[1]);
        assert_eq!(Watermark::Endorsement.as_bytes(), &[2]);
        assert_eq!(Watermark::Generic.as_bytes(), &[3]);
    }

    #[test]
    fn sign_with_generic_watermark_is_deterministic() {
        let signed = sign("deadbeef", &keys(), Some(Watermark::Generic)).unwrap();
        assert_eq!(signed.encoded_signature, DEADBEEF_SIG);
        assert_eq!(signed.payload, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn signed_hex_is_payload_then_signature() {
        let signed = sign("deadbeef", &keys(), Some(Watermark::Generic)).unwrap();
        assert_eq!(signed.signed_hex.len(), 8 + 128);
        assert_eq!(
            signed.signed_hex,
            format!("deadbeef{}", hex::encode(signed.signature))
        );
    }

    #[test]
    fn signed_hex_keeps_message_text_as_given() {
        let upper = sign("DEADBEEF", &keys(), Some(Watermark::Generic)).unwrap();
        let lower = sign("deadbeef", &keys(), Some(Watermark::Generic)).unwrap();

        assert_eq!(upper.signature, lower.signature);
        assert_eq!(
            upper.signed_hex,
            format!("DEADBEEF{}", hex::encode(upper.signature))
        );
        assert!(SignedMessage::unsigned("0A0B").unwrap().signed_hex.starts_with("0A0B00"));
    }

    #[test]
    fn watermark_changes_signature() {
        let with = sign("deadbeef", &keys(), Some(Watermark::Generic)).unwrap();
        let without = sign("deadbeef", &keys(), None).unwrap();
        assert_ne!(with.signature, without.signature);
        assert_eq!(with.payload, without.payload);
    }

    #[test]
    fn verify_checks_raw_message_not_digest() {
        let signed = sign("deadbeef", &keys(), Some(Watermark::Generic)).unwrap();

        assert!(!verify("deadbeef", &signed.signature, EDPK).unwrap());
        assert!(verify(DEADBEEF_DIGEST, &signed.signature, EDPK).unwrap());
    }

    #[test]
    fn verify_rejects_bad_inputs() {
        let signed = sign("deadbeef", &keys(), None).unwrap();

        assert!(matches!(
            verify("zz", &signed.signature, EDPK),
            Err(TezosError::InvalidHex(_))
        ));
        assert!(matches!(
            verify("deadbeef", &signed.signature[..10], EDPK),
            Err(TezosError::Signature(_))
        ));
        assert!(matches!(
            verify("deadbeef", &signed.signature, "edpk.bad"),
            Err(TezosError::Codec(_))
        ));
    }

    #[test]
    fn odd_length_hex_is_rejected() {
        assert!(matches!(
            sign("abc", &keys(), None),
            Err(TezosError::InvalidHex(_))
        ));
    }

    #[test]
    fn unsigned_message_uses_placeholder() {
        let unsigned = SignedMessage::unsigned("0a0b").unwrap();
        assert_eq!(unsigned.signature, [0u8; 64]);
        assert_eq!(unsigned.encoded_signature, PLACEHOLDER_SIGNATURE);
        assert_eq!(unsigned.signed_hex, format!("0a0b{}", "0".repeat(128)));
        assert_eq!(
            base58check::encode(&[0u8; 64], prefix::EDSIG),
            PLACEHOLDER_SIGNATURE
        );
    }

    #[test]
    fn payload_hash_encodes_digest_without_prefix() {
        let signed = sign("deadbeef", &keys(), None).unwrap();
        let decoded = base58check::decode(&signed.payload_hash(), &[]).unwrap();
        assert_eq!(decoded, hash::digest(&[0xde, 0xad, 0xbe, 0xef]).to_vec());
    }
}
