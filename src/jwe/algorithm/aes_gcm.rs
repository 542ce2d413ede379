use alloc::vec::Vec;

use secrecy::ExposeSecret as _;

use super::{ContentEncryption, ContentEncryptionKey};
use crate::{
    crypto::{
        self,
        aes_gcm::{IV_LEN, TAG_LEN},
    },
    jwa::{self, JsonWebContentEncryptionAlgorithm},
    jwe::Error,
};

/// `A128GCM`, `A192GCM` and `A256GCM` from [section 5.3 of RFC 7518].
///
/// [section 5.3 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.3>
#[derive(Debug, Clone, Copy)]
pub struct AesGcmEncryption {
    variant: jwa::AesGcm,
}

impl AesGcmEncryption {
    /// Creates the algorithm for the given key size.
    pub const fn new(variant: jwa::AesGcm) -> Self {
        Self { variant }
    }
}

impl ContentEncryption for AesGcmEncryption {
    fn algorithm(&self) -> JsonWebContentEncryptionAlgorithm {
        JsonWebContentEncryptionAlgorithm::AesGcm(self.variant)
    }

    fn key_len(&self) -> usize {
        self.variant.key_len()
    }

    fn iv_len(&self) -> usize {
        IV_LEN
    }

    fn tag_len(&self) -> usize {
        TAG_LEN
    }

    fn encrypt(
        &self,
        cek: &ContentEncryptionKey,
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error> {
        crypto::aes_gcm::encrypt(self.variant, cek.expose_secret(), iv, aad, plaintext)
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
        crypto::aes_gcm::decrypt(self.variant, cek.expose_secret(), iv, aad, ciphertext, tag)
            .map_err(|e| match e {
                crypto::Error::InvalidLength => Error::KeyManagementFailure(e.into()),
                _ => Error::AuthenticationFailure,
            })
    }
}
