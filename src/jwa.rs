//! Implementation of the JSON Web Algorithms (JWA) used by JWE, as defined in
//! [RFC 7518]
//!
//! This module only contains the identifiers. The actual algorithm
//! implementations live in [`jwe::algorithm`](crate::jwe::algorithm).
//!
//! [RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518>

mod aes_cbc_hs;
mod aes_gcm;
mod aes_kw;

use alloc::string::String;

#[doc(inline)]
pub use self::{aes_cbc_hs::AesCbcHs, aes_gcm::AesGcm, aes_kw::AesKw};

/// A JSON Web Algorithm (JWA) for encryption and decryption of the Content
/// Encryption Key (CEK) as defined in [RFC 7518 section 4]
///
/// This enum covers the `alg` Header Parameter Values for JWE that this crate
/// implements. It is a subset of the table from [section 4.1].
///
/// [RFC 7518 section 4]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4>
/// [section 4.1]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.1>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebEncryptionAlgorithm {
    /// AES Key Wrap
    AesKw(AesKw),
    /// Direct use of a shared symmetric key as the CEK as defined in [section
    /// 4.5]
    ///
    /// [section 4.5]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.5>
    Direct,
    /// Key wrapping with AES GCM
    AesGcmKw(AesGcm),
    /// JSON Web Algorithms that are not recognised by this implementation.
    ///
    /// If you want to register a custom key management algorithm in a
    /// [`Registry`](crate::jwe::algorithm::Registry), use this variant to
    /// identify it.
    Other(String),
}

impl_serde_jwa!(
    JsonWebEncryptionAlgorithm,
    [
        "A128KW" => Self::AesKw(AesKw::Aes128); Self::AesKw(AesKw::Aes128),
        "A192KW" => Self::AesKw(AesKw::Aes192); Self::AesKw(AesKw::Aes192),
        "A256KW" => Self::AesKw(AesKw::Aes256); Self::AesKw(AesKw::Aes256),
        "dir" => Self::Direct; Self::Direct,
        "A128GCMKW" => Self::AesGcmKw(AesGcm::Aes128); Self::AesGcmKw(AesGcm::Aes128),
        "A192GCMKW" => Self::AesGcmKw(AesGcm::Aes192); Self::AesGcmKw(AesGcm::Aes192),
        "A256GCMKW" => Self::AesGcmKw(AesGcm::Aes256); Self::AesGcmKw(AesGcm::Aes256),
    ]
);

impl From<AesKw> for JsonWebEncryptionAlgorithm {
    fn from(x: AesKw) -> Self {
        Self::AesKw(x)
    }
}

/// A JSON Web Algorithm (JWA) for content encryption and decryption of a JWE as
/// defined in [RFC 7518 section 5]
///
/// This enum covers the `enc` Header Parameter Values for JWE. It represents
/// the table from [section 5.1].
///
/// [RFC 7518 section 5]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5>
/// [section 5.1]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.1>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JsonWebContentEncryptionAlgorithm {
    /// Content Encryption using AES in CBC mode with HMAC
    AesCbcHs(AesCbcHs),
    /// Content Encryption using AES GCM
    AesGcm(AesGcm),
    /// JSON Web Algorithms that are not recognised by this implementation.
    ///
    /// Use this variant if you want to implement a custom content encryption
    /// algorithm.
    Other(String),
}

impl_serde_jwa!(
    JsonWebContentEncryptionAlgorithm,
    [
        "A128CBC-HS256" => Self::AesCbcHs(AesCbcHs::Aes128CbcHs256); Self::AesCbcHs(AesCbcHs::Aes128CbcHs256),
        "A192CBC-HS384" => Self::AesCbcHs(AesCbcHs::Aes192CbcHs384); Self::AesCbcHs(AesCbcHs::Aes192CbcHs384),
        "A256CBC-HS512" => Self::AesCbcHs(AesCbcHs::Aes256CbcHs512); Self::AesCbcHs(AesCbcHs::Aes256CbcHs512),

        "A128GCM" => Self::AesGcm(AesGcm::Aes128); Self::AesGcm(AesGcm::Aes128),
        "A192GCM" => Self::AesGcm(AesGcm::Aes192); Self::AesGcm(AesGcm::Aes192),
        "A256GCM" => Self::AesGcm(AesGcm::Aes256); Self::AesGcm(AesGcm::Aes256),
    ]
);

/// A compression algorithm for the `zip` header parameter as defined in
/// [section 4.1.3 of RFC 7516]
///
/// [section 4.1.3 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-4.1.3>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    /// Compression with the DEFLATE [RFC 1951] algorithm
    ///
    /// [RFC 1951]: <https://datatracker.ietf.org/doc/html/rfc1951>
    Deflate,
    /// Compression algorithms that are not recognised by this implementation.
    Other(String),
}

impl_serde_jwa!(
    CompressionAlgorithm,
    [
        "DEF" => Self::Deflate; Self::Deflate,
    ]
);
