use alloc::vec::Vec;

use super::{
    symmetric_key, ContentEncryptionKey, KeyManagement, KeyManagementMode, WrappedKey,
};
use crate::{
    header::HeaderBag,
    jwa::JsonWebEncryptionAlgorithm,
    jwe::{Error, KeyManagementError},
    jwk::JsonWebKey,
};

/// Direct use of a shared symmetric key as the CEK (`dir`), [section 4.5 of
/// RFC 7518].
///
/// [section 4.5 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.5>
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl KeyManagement for Direct {
    fn algorithm(&self) -> JsonWebEncryptionAlgorithm {
        JsonWebEncryptionAlgorithm::Direct
    }

    fn mode(&self) -> KeyManagementMode {
        KeyManagementMode::DirectEncryption
    }

    fn wrap(
        &self,
        _cek: &ContentEncryptionKey,
        _key: &JsonWebKey,
        _header: &HeaderBag,
    ) -> Result<WrappedKey, Error> {
        // the CEK is the key itself, the encrypted key stays empty
        Ok(WrappedKey::default())
    }

    fn unwrap(
        &self,
        encrypted_key: &[u8],
        key: &JsonWebKey,
        header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error> {
        if !encrypted_key.is_empty() {
            return Err(KeyManagementError::UnexpectedEncryptedKey.into());
        }

        self.derive_key(key, header)
    }

    fn derive_key(
        &self,
        key: &JsonWebKey,
        _header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error> {
        let key = symmetric_key(key)?;
        Ok(ContentEncryptionKey::from(Vec::from(key)))
    }
}
