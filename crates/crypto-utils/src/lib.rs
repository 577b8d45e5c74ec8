//! # crypto-utils
//!
//! Secret-hygiene primitives shared by the wallet crates: zeroizing secret
//! buffers, sealed in-memory storage for key material, PBKDF2 key stretching
//! and OS-backed randomness.

pub mod error;
pub mod kdf;
pub mod protected;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use protected::ProtectedBytes;
pub use zeroizing::SecretBuffer;
