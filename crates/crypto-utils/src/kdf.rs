use hmac::Hmac;
use sha2::Sha512;

use crate::error::CryptoError;
use crate::zeroizing::SecretBuffer;

/// Output size of PBKDF2-HMAC-SHA512 as used for BIP-39 seeds.
pub const SHA512_OUTPUT_LEN: usize = 64;

/// Stretches `password` with PBKDF2, HMAC-SHA512 as the PRF, producing 64
/// bytes in a zeroizing buffer.
pub fn pbkdf2_sha512(password: &[u8], salt: &[u8], rounds: u32) -> Result<SecretBuffer, CryptoError> {
    if rounds == 0 {
        return Err(CryptoError::KdfFailed("iteration count must be non-zero".into()));
    }

    let mut output = SecretBuffer::zeroed(SHA512_OUTPUT_LEN);
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, rounds, output.expose_mut())
        .map_err(|e| CryptoError::KdfFailed(format!("pbkdf2 failed: {e}")))?;

    Ok(output)
}
