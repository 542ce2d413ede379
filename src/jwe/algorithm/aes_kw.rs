use secrecy::ExposeSecret as _;

use super::{
    symmetric_key, ContentEncryptionKey, KeyManagement, KeyManagementMode, WrappedKey,
};
use crate::{
    crypto,
    header::HeaderBag,
    jwa::{self, JsonWebEncryptionAlgorithm},
    jwe::{Error, KeyManagementError},
    jwk::JsonWebKey,
};

/// `A128KW`, `A192KW` and `A256KW` from [section 4.4 of RFC 7518].
///
/// [section 4.4 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.4>
#[derive(Debug, Clone, Copy)]
pub struct AesKeyWrap {
    variant: jwa::AesKw,
}

impl AesKeyWrap {
    /// Creates the algorithm for the given key size.
    pub const fn new(variant: jwa::AesKw) -> Self {
        Self { variant }
    }
}

impl KeyManagement for AesKeyWrap {
    fn algorithm(&self) -> JsonWebEncryptionAlgorithm {
        JsonWebEncryptionAlgorithm::AesKw(self.variant)
    }

    fn mode(&self) -> KeyManagementMode {
        KeyManagementMode::KeyWrapping
    }

    fn wrap(
        &self,
        cek: &ContentEncryptionKey,
        key: &JsonWebKey,
        _header: &HeaderBag,
    ) -> Result<WrappedKey, Error> {
        let kek = symmetric_key(key)?;
        let encrypted_key = crypto::aes_kw::wrap(self.variant, kek, cek.expose_secret())
            .map_err(KeyManagementError::from)?;

        Ok(WrappedKey {
            encrypted_key,
            header: HeaderBag::new(),
        })
    }

    fn unwrap(
        &self,
        encrypted_key: &[u8],
        key: &JsonWebKey,
        _header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error> {
        let kek = symmetric_key(key)?;
        let cek = crypto::aes_kw::unwrap(self.variant, kek, encrypted_key)
            .map_err(KeyManagementError::from)?;

        Ok(ContentEncryptionKey::from(cek.to_vec()))
    }
}
