//! Symmetric keys for JWE

use alloc::vec::Vec;

use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use crate::{base64_url::SecretBase64UrlBytes, crypto};

/// The key material of a `kty: oct` key, the `k` parameter from [section 6.4.1
/// of RFC 7518].
///
/// The bytes are zeroized on drop and never shown by [`Debug`].
///
/// [section 6.4.1 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6.4.1>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetSequence(pub(crate) SecretBase64UrlBytes);

impl OctetSequence {
    /// Wraps the given raw key bytes.
    pub fn new(x: impl Into<Vec<u8>>) -> Self {
        Self(SecretBase64UrlBytes(Zeroizing::new(x.into())))
    }

    /// Generates a new random key with `len` bytes.
    ///
    /// # Errors
    ///
    /// Fails if the operating system has no randomness available.
    pub fn generate(len: usize) -> Result<Self, crypto::Error> {
        let mut bytes = Zeroizing::new(alloc::vec![0u8; len]);
        crypto::fill_random(&mut bytes)?;
        Ok(Self(SecretBase64UrlBytes(bytes)))
    }

    /// Returns the number of bytes that are in this octet sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.0 .0.len()
    }

    /// Returns `true` if this octet sequence has a length of zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExposeSecret<[u8]> for OctetSequence {
    fn expose_secret(&self) -> &[u8] {
        &self.0 .0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_has_requested_length() {
        let a = OctetSequence::generate(32).unwrap();
        let b = OctetSequence::generate(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
