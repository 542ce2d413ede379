//! Cryptographic primitives.
//!
//! This module wraps the [RustCrypto] implementations of the primitives the
//! JWE algorithms are built from: AES Key Wrap, AES-GCM and the composite
//! AES-CBC with HMAC-SHA2 construction. The functions take raw byte slices
//! and check all lengths themselves, so they never panic on bad input.
//!
//! [RustCrypto]: https://github.com/RustCrypto

pub mod aes_cbc_hs;
pub mod aes_gcm;
pub mod aes_kw;

use alloc::vec::Vec;

use rand_core::{OsRng, RngCore as _};
use thiserror::Error;

/// The result type used for cryptographic operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The errors the primitives can return.
///
/// None of them tells which byte of a tag or a padding was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A key, IV or tag has the wrong length for the algorithm.
    #[error("invalid key, iv or tag length")]
    InvalidLength,
    /// AES Key Wrap integrity check failed.
    #[error("failed to unwrap the key")]
    Unwrap,
    /// The authentication tag did not verify.
    #[error("authentication failed")]
    Authentication,
    /// Block padding was invalid after decryption.
    #[error("invalid padding")]
    Padding,
    /// The random number generator failed.
    #[error("failed to generate random bytes")]
    Random,
}

impl From<digest::InvalidLength> for Error {
    fn from(_: digest::InvalidLength) -> Self {
        Self::InvalidLength
    }
}

/// Fills the buffer with cryptographically secure random bytes from the
/// operating system.
///
/// # Errors
///
/// Returns [`Error::Random`] if the operating system RNG is unavailable.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|_| Error::Random)
}

/// Returns `len` fresh random bytes.
///
/// # Errors
///
/// Returns [`Error::Random`] if the operating system RNG is unavailable.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = alloc::vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}
