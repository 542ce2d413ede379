use alloc::vec::Vec;

use secrecy::ExposeSecret as _;

use super::{ContentEncryption, ContentEncryptionKey};
use crate::{
    crypto::{self, aes_cbc_hs::IV_LEN},
    jwa::{self, JsonWebContentEncryptionAlgorithm},
    jwe::Error,
};

/// `A128CBC-HS256`, `A192CBC-HS384` and `A256CBC-HS512` from [section 5.2 of
/// RFC 7518].
///
/// [section 5.2 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2>
#[derive(Debug, Clone, Copy)]
pub struct AesCbcHmacSha2 {
    variant: jwa::AesCbcHs,
}

impl AesCbcHmacSha2 {
    /// Creates the algorithm for the given variant.
    pub const fn new(variant: jwa::AesCbcHs) -> Self {
        Self { variant }
    }
}

impl ContentEncryption for AesCbcHmacSha2 {
    fn algorithm(&self) -> JsonWebContentEncryptionAlgorithm {
        JsonWebContentEncryptionAlgorithm::AesCbcHs(self.variant)
    }

    fn key_len(&self) -> usize {
        self.variant.key_len()
    }

    fn iv_len(&self) -> usize {
        IV_LEN
    }

    fn tag_len(&self) -> usize {
        self.variant.tag_len()
    }

    fn encrypt(
        &self,
        cek: &ContentEncryptionKey,
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error> {
        crypto::aes_cbc_hs::encrypt(self.variant, cek.expose_secret(), iv, aad, plaintext)
            .map_err(|e| Error::KeyManagementFailure(e.into()))
    }

    fn decrypt(
        &self,
        cek: &ContentEncryptionKey,
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, Error> {
        crypto::aes_cbc_hs::decrypt(self.variant, cek.expose_secret(), iv, aad, ciphertext, tag)
            .map_err(|e| match e {
                crypto::Error::InvalidLength => Error::KeyManagementFailure(e.into()),
                _ => Error::AuthenticationFailure,
            })
    }
}
