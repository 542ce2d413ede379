//! The pluggable algorithm catalog.
//!
//! Every key management algorithm (`alg`) implements [`KeyManagement`], every
//! content encryption algorithm (`enc`) implements [`ContentEncryption`] and
//! every compression method (`zip`) implements
//! [`Compression`](crate::compression::Compression). A [`Registry`] maps the
//! tokens to implementations and an [`AlgorithmManager`] restricts a registry
//! to the tokens an application explicitly trusts.

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use hashbrown::HashSet;
use secrecy::{ExposeSecret as _, SecretSlice};

use super::{Error, KeyManagementError};
use crate::{
    compression::Compression,
    header::HeaderBag,
    jwa::{AesCbcHs, AesGcm, AesKw, JsonWebContentEncryptionAlgorithm, JsonWebEncryptionAlgorithm},
    jwk::JsonWebKey,
};

mod aes_cbc_hs;
mod aes_gcm;
mod aes_gcm_kw;
mod aes_kw;
mod direct;

#[doc(inline)]
pub use self::{
    aes_cbc_hs::AesCbcHmacSha2, aes_gcm::AesGcmEncryption, aes_gcm_kw::AesGcmKeyWrap,
    aes_kw::AesKeyWrap, direct::Direct,
};

/// The symmetric key the payload is encrypted with.
pub type ContentEncryptionKey = SecretSlice<u8>;

/// How a key management algorithm determines the content encryption key, see
/// [section 2 of RFC 7516].
///
/// [section 2 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-2>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyManagementMode {
    /// The CEK is the shared symmetric key itself. Only one recipient is
    /// possible.
    DirectEncryption,
    /// A random CEK is encrypted for each recipient.
    KeyWrapping,
}

/// The result of [`KeyManagement::wrap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedKey {
    /// The JWE Encrypted Key of the recipient.
    pub encrypted_key: Vec<u8>,
    /// Header parameters that the algorithm produced and that the recipient
    /// needs for unwrapping, like `iv` and `tag` of AES GCM key wrapping.
    pub header: HeaderBag,
}

/// A key management algorithm, identified by an `alg` token.
pub trait KeyManagement: fmt::Debug + Send + Sync {
    /// The `alg` value this algorithm is registered under.
    fn algorithm(&self) -> JsonWebEncryptionAlgorithm;

    /// How the CEK is determined.
    fn mode(&self) -> KeyManagementMode;

    /// Encrypts `cek` for the recipient that owns `key`.
    ///
    /// `header` is the complete header view of the recipient. Parameters the
    /// algorithm needs to transmit are returned in [`WrappedKey::header`],
    /// never written into caller owned headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyManagementFailure`] if the key does not fit.
    fn wrap(
        &self,
        cek: &ContentEncryptionKey,
        key: &JsonWebKey,
        header: &HeaderBag,
    ) -> Result<WrappedKey, Error>;

    /// Recovers the CEK from the encrypted key of a recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyManagementFailure`] if the key does not fit or the
    /// encrypted key does not unwrap.
    fn unwrap(
        &self,
        encrypted_key: &[u8],
        key: &JsonWebKey,
        header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error>;

    /// Determines the CEK for [`KeyManagementMode::DirectEncryption`].
    ///
    /// # Errors
    ///
    /// The default implementation always fails with
    /// [`Error::IncompatibleDirectMode`].
    fn derive_key(
        &self,
        key: &JsonWebKey,
        header: &HeaderBag,
    ) -> Result<ContentEncryptionKey, Error> {
        let _ = (key, header);
        Err(Error::IncompatibleDirectMode)
    }
}

/// An authenticated content encryption algorithm, identified by an `enc`
/// token.
pub trait ContentEncryption: fmt::Debug + Send + Sync {
    /// The `enc` value this algorithm is registered under.
    fn algorithm(&self) -> JsonWebContentEncryptionAlgorithm;

    /// The length of the CEK in bytes.
    fn key_len(&self) -> usize;

    /// The length of the initialization vector in bytes.
    fn iv_len(&self) -> usize;

    /// The length of the authentication tag in bytes.
    fn tag_len(&self) -> usize;

    /// Encrypts and authenticates `plaintext`, returning the ciphertext and
    /// the tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyManagementFailure`] for a CEK of the wrong size.
    fn encrypt(
        &self,
        cek: &ContentEncryptionKey,
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error>;

    /// Verifies the tag and decrypts `ciphertext`. No plaintext is returned
    /// unless the tag is valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailure`] if the message is not
    /// authentic and [`Error::KeyManagementFailure`] for a CEK of the wrong
    /// size.
    fn decrypt(
        &self,
        cek: &ContentEncryptionKey,
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, Error>;
}

/// Returns the raw bytes of a symmetric key.
pub(crate) fn symmetric_key(key: &JsonWebKey) -> Result<&[u8], KeyManagementError> {
    key.octet_sequence()
        .map(|k| k.expose_secret())
        .ok_or(KeyManagementError::NotSymmetric)
}

/// Reads a Base64Url encoded header parameter.
pub(crate) fn base64url_parameter(
    header: &HeaderBag,
    name: &'static str,
) -> Result<Vec<u8>, KeyManagementError> {
    header
        .get_str(name)
        .and_then(|v| crate::base64_url::decode(v).ok())
        .ok_or(KeyManagementError::HeaderParameter(name))
}

/// The catalog of all known algorithm implementations, keyed by their token.
#[derive(Debug, Default)]
pub struct Registry {
    key_management: BTreeMap<String, Box<dyn KeyManagement>>,
    content_encryption: BTreeMap<String, Box<dyn ContentEncryption>>,
    compression: BTreeMap<String, Box<dyn Compression>>,
}

impl Registry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            key_management: BTreeMap::new(),
            content_encryption: BTreeMap::new(),
            compression: BTreeMap::new(),
        }
    }

    /// A registry with every algorithm this crate implements.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_key_management(Box::new(Direct));
        for variant in [AesKw::Aes128, AesKw::Aes192, AesKw::Aes256] {
            registry.register_key_management(Box::new(AesKeyWrap::new(variant)));
        }
        for variant in [AesGcm::Aes128, AesGcm::Aes192, AesGcm::Aes256] {
            registry.register_key_management(Box::new(AesGcmKeyWrap::new(variant)));
            registry.register_content_encryption(Box::new(AesGcmEncryption::new(variant)));
        }
        for variant in [
            AesCbcHs::Aes128CbcHs256,
            AesCbcHs::Aes192CbcHs384,
            AesCbcHs::Aes256CbcHs512,
        ] {
            registry.register_content_encryption(Box::new(AesCbcHmacSha2::new(variant)));
        }

        #[cfg(feature = "deflate")]
        registry.register_compression(Box::new(crate::compression::Deflate::default()));

        registry
    }

    /// Adds a key management algorithm, replacing one with the same token.
    pub fn register_key_management(&mut self, algorithm: Box<dyn KeyManagement>) {
        self.key_management
            .insert(algorithm.algorithm().to_string(), algorithm);
    }

    /// Adds a content encryption algorithm, replacing one with the same token.
    pub fn register_content_encryption(&mut self, algorithm: Box<dyn ContentEncryption>) {
        self.content_encryption
            .insert(algorithm.algorithm().to_string(), algorithm);
    }

    /// Adds a compression method, replacing one with the same token.
    pub fn register_compression(&mut self, method: Box<dyn Compression>) {
        self.compression.insert(method.algorithm().to_string(), method);
    }

    /// All registered `alg` tokens.
    pub fn key_management_algorithms(&self) -> impl Iterator<Item = &str> {
        self.key_management.keys().map(String::as_str)
    }

    /// All registered `enc` tokens.
    pub fn content_encryption_algorithms(&self) -> impl Iterator<Item = &str> {
        self.content_encryption.keys().map(String::as_str)
    }

    /// All registered `zip` tokens.
    pub fn compression_methods(&self) -> impl Iterator<Item = &str> {
        self.compression.keys().map(String::as_str)
    }
}

/// A [`Registry`] restricted to explicitly allowed tokens.
///
/// There is no allow-everything default: every `alg`, `enc` and `zip` value
/// the application wants to accept has to be listed.
///
/// ```
/// # use jwe::jwe::algorithm::AlgorithmManager;
/// let manager =
///     AlgorithmManager::with_allowed(["A256GCMKW"], ["A128CBC-HS256"], ["DEF"]).unwrap();
/// assert!(manager.key_management("A256GCMKW").is_ok());
/// assert!(manager.key_management("A128KW").is_err());
/// ```
#[derive(Debug)]
pub struct AlgorithmManager {
    registry: Registry,
    key_management: HashSet<String>,
    content_encryption: HashSet<String>,
    compression: HashSet<String>,
}

fn allow_list<V>(
    tokens: impl IntoIterator<Item = impl Into<String>>,
    known: &BTreeMap<String, V>,
) -> Result<HashSet<String>, Error> {
    tokens
        .into_iter()
        .map(|token| {
            let token: String = token.into();
            if known.contains_key(&token) {
                Ok(token)
            } else {
                Err(Error::UnsupportedAlgorithm(token))
            }
        })
        .collect()
}

impl AlgorithmManager {
    /// Creates a manager over `registry` that allows the given `alg`, `enc`
    /// and `zip` tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] for a token that is not in
    /// the registry.
    pub fn new(
        registry: Registry,
        key_management: impl IntoIterator<Item = impl Into<String>>,
        content_encryption: impl IntoIterator<Item = impl Into<String>>,
        compression: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, Error> {
        let key_management = allow_list(key_management, &registry.key_management)?;
        let content_encryption = allow_list(content_encryption, &registry.content_encryption)?;
        let compression = allow_list(compression, &registry.compression)?;

        Ok(Self {
            registry,
            key_management,
            content_encryption,
            compression,
        })
    }

    /// Same as [`AlgorithmManager::new`] using [`Registry::standard`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] for a token this crate does not
    /// implement.
    pub fn with_allowed(
        key_management: impl IntoIterator<Item = impl Into<String>>,
        content_encryption: impl IntoIterator<Item = impl Into<String>>,
        compression: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, Error> {
        Self::new(
            Registry::standard(),
            key_management,
            content_encryption,
            compression,
        )
    }

    /// Looks up an allowed key management algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] if the token is unknown or not
    /// allowed.
    pub fn key_management(&self, alg: &str) -> Result<&dyn KeyManagement, Error> {
        self.key_management
            .contains(alg)
            .then(|| self.registry.key_management.get(alg))
            .flatten()
            .map(Box::as_ref)
            .ok_or_else(|| Error::UnsupportedAlgorithm(alg.into()))
    }

    /// Looks up an allowed content encryption algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] if the token is unknown or not
    /// allowed.
    pub fn content_encryption(&self, enc: &str) -> Result<&dyn ContentEncryption, Error> {
        self.content_encryption
            .contains(enc)
            .then(|| self.registry.content_encryption.get(enc))
            .flatten()
            .map(Box::as_ref)
            .ok_or_else(|| Error::UnsupportedAlgorithm(enc.into()))
    }

    /// Looks up an allowed compression method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] if the token is unknown or not
    /// allowed.
    pub fn compression(&self, zip: &str) -> Result<&dyn Compression, Error> {
        self.compression
            .contains(zip)
            .then(|| self.registry.compression.get(zip))
            .flatten()
            .map(Box::as_ref)
            .ok_or_else(|| Error::UnsupportedAlgorithm(zip.into()))
    }

    /// The underlying registry.
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_token_at_construction() {
        let err = AlgorithmManager::with_allowed(["RSA-OAEP"], ["A128GCM"], None::<&str>)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(alg) if alg == "RSA-OAEP"));
    }

    #[test]
    fn only_allowed_tokens_resolve() {
        let manager =
            AlgorithmManager::with_allowed(["A128KW", "dir"], ["A128GCM"], None::<&str>).unwrap();

        assert!(manager.key_management("A128KW").is_ok());
        assert!(manager.key_management("dir").is_ok());
        // registered, but not allowed
        assert!(matches!(
            manager.key_management("A256KW"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(manager.content_encryption("A256GCM").is_err());
        assert!(manager.compression("DEF").is_err());
    }

    #[test]
    fn empty_allow_lists_allow_nothing() {
        let manager = AlgorithmManager::with_allowed(
            Vec::<String>::new(),
            Vec::<String>::new(),
            Vec::<String>::new(),
        )
        .unwrap();
        assert!(manager.key_management("dir").is_err());
    }

    #[test]
    fn standard_registry() {
        let registry = Registry::standard();
        let alg: Vec<_> = registry.key_management_algorithms().collect();
        assert_eq!(
            alg,
            [
                "A128GCMKW", "A128KW", "A192GCMKW", "A192KW", "A256GCMKW", "A256KW", "dir"
            ]
        );
        assert_eq!(registry.content_encryption_algorithms().count(), 6);

        let zip: Vec<_> = registry.compression_methods().collect();
        #[cfg(feature = "deflate")]
        assert_eq!(zip, ["DEF"]);
        #[cfg(not(feature = "deflate"))]
        assert!(zip.is_empty());
    }
}
