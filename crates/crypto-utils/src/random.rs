use rand::RngCore;
use rand_core::OsRng;

use crate::zeroizing::SecretBuffer;

/// Fills `buf` from the operating system's CSPRNG.
pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Generates `len` random bytes straight into a zeroizing buffer, for seeds
/// and mnemonic entropy.
pub fn random_secret(len: usize) -> SecretBuffer {
    let mut buf = SecretBuffer::zeroed(len);
    fill_random(buf.expose_mut());
    buf
}
