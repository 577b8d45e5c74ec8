use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Heap buffer for secret bytes (seeds, raw keys, unsealed plaintext) that is
/// overwritten with zeros when dropped.
///
/// The buffer is not `Clone` and its `Debug` output never shows the contents.
/// Reading goes through [`SecretBuffer::expose`], which hands out a borrow tied
/// to the buffer's lifetime rather than an owned copy.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBuffer(Vec<u8>);

impl SecretBuffer {
    /// Wraps already-owned secret bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Copies `source` into a new buffer and wipes `source` in place.
    pub fn take_from(source: &mut [u8]) -> Self {
        let buffer = Self(source.to_vec());
        source.zeroize();
        buffer
    }

    /// Allocates a zero-filled buffer of `len` bytes, to be filled through
    /// [`SecretBuffer::expose_mut`].
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0u8; len])
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn expose_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBuffer([REDACTED; {} bytes])", self.0.len())
    }
}

impl From<Vec<u8>> for SecretBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
