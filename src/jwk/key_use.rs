use alloc::string::String;

/// This enum represents possible key usage (`use`) parameter as
/// defined in [Section 4.2 of RFC 7517]. All possible values are registered in
/// the [IANA `JSON Web Key Use` registry].
///
/// [Section 4.2 of RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517#section-4.2>
/// [IANA `JSON Web Key Use` registry]: <https://www.iana.org/assignments/jose/jose.xhtml#web-key-use>
#[non_exhaustive]
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum KeyUsage {
    /// The `sig` (signature) value
    Signing,
    /// The `enc` (encryption) value
    Encryption,
    /// Some other case-sensitive [`String`] that did not match any of the
    /// publicly known variants
    Other(String),
}

impl_serde_jwa!(
    KeyUsage,
    [
        "sig" => Self::Signing; Self::Signing,
        "enc" => Self::Encryption; Self::Encryption,
    ]
);
