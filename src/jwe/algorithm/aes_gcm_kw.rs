use secrecy::ExposeSecret as _;

use super::{
    base64url_parameter, symmetric_key, ContentEncryptionKey, KeyManagement, KeyManagementMode,
    WrappedKey,
};
use crate::{
    base64_url::Base64UrlString,
    crypto::{self, aes_gcm::IV_LEN},
    header::HeaderBag,
    jwa::{self, JsonWebEncryptionAlgorithm},
    jwe::{Error, KeyManagementError},
    jwk::JsonWebKey,
};

/// `A128GCMKW`, `A192GCMKW` and `A256GCMKW` from [section 4.7 of RFC 7518].
///
/// Wrapping uses a fresh random IV. The IV and the resulting tag are not part
/// of the encrypted key, they are returned as the `iv` and `tag` header
/// parameters.
///
/// [section 4.7 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.7>
#[derive(Debug, Clone, Copy)]
pub struct AesGcmKeyWrap {
    variant: jwa::AesGcm,
}

impl AesGcmKeyWrap {
    /// Creates the algorithm for the given key size.
    pub const fn new(variant: jwa::AesGcm) -> Self {
        Self { variant }
    }
}

impl KeyManagement for AesGcmKeyWrap {
    fn algorithm(&self) -> JsonWebEncryptionAlgorithm {
        JsonWebEncryptionAlgorithm::AesGcmKw(self.variant)
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
        let iv = crypto::random_bytes(IV_LEN).map_err(Error::Crypto)?;

        let (encrypted_key, tag) =
            crypto::aes_gcm::encrypt(self.variant, kek, &iv, &[], cek.expose_secret())
                .map_err(KeyManagementError::from)?;

        let header = HeaderBag::new()
            .with("iv", Base64UrlString::encode(&iv).into_inner())
            .with("tag", Base64UrlString::encode(&tag).into_inner());

        Ok(WrappedKey {
            encrypted_key,
            header,
        })
    }

    fn unwrap(
        &self,
        encrypted_key: &[u8],
        key: &JsonWebKey,
        header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error> {
        let kek = symmetric_key(key)?;
        let iv = base64url_parameter(header, "iv")?;
        let tag = base64url_parameter(header, "tag")?;

        let cek = crypto::aes_gcm::decrypt(self.variant, kek, &iv, &[], encrypted_key, &tag)
            .map_err(KeyManagementError::from)?;

        Ok(ContentEncryptionKey::from(cek))
    }
}
