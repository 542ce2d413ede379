use alloc::string::{String, ToString};

use crate::{compression, crypto, header};

/// Errors that can occur while building, decrypting or (de)serializing a
/// [`JsonWebEncryption`](super::JsonWebEncryption).
///
/// The [`JweDecrypter`](super::JweDecrypter) only ever returns
/// [`Error::DecryptionFailed`] for failed attempts; the other kinds are seen
/// by the builder, the serializers and custom algorithm implementations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A header parameter is defined in more than one header with different
    /// values, or appears in two headers that must be disjoint.
    #[error("header parameter `{0}` is defined more than once")]
    HeaderConflict(String),
    /// A required header parameter (`alg` or `enc`) is missing.
    #[error("missing `{0}` header parameter")]
    MissingHeader(&'static str),
    /// A header parameter that has to be integrity protected is not in the
    /// protected header.
    #[error("header parameter `{0}` must be protected")]
    UnprotectedParameter(&'static str),
    /// The algorithm is unknown to the registry or not on the allow-list.
    #[error("unsupported or not allowed algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    /// Wrapping or unwrapping the content encryption key failed.
    #[error("key management failed: {0}")]
    KeyManagementFailure(#[from] KeyManagementError),
    /// The authentication tag did not verify.
    #[error("authentication failed")]
    AuthenticationFailure,
    /// A direct key management algorithm was combined with more than one
    /// recipient.
    #[error("direct key management only allows a single recipient")]
    IncompatibleDirectMode,
    /// The message was built without any recipient.
    #[error("no recipients")]
    NoRecipients,
    /// The message was built without a payload.
    #[error("no payload")]
    MissingPayload,
    /// The payload could not be (de)compressed.
    #[error(transparent)]
    Compression(compression::Error),
    /// A cryptographic primitive that is not tied to a key failed, e.g. the
    /// random number generator.
    #[error(transparent)]
    Crypto(crypto::Error),
    /// The requested serialization can not represent the message.
    #[error("the message can not be serialized to this format: {0}")]
    IncompatibleSerialization(&'static str),
    /// No serializer with this name is registered.
    #[error("unknown serializer `{0}`")]
    UnknownSerializer(String),
    /// The input is not a well formed JWE in the expected format.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    /// No recipient could be decrypted with any of the keys.
    ///
    /// It does not tell which attempt failed or why.
    #[error("unable to decrypt the message")]
    DecryptionFailed,
}

impl From<header::Error> for Error {
    fn from(err: header::Error) -> Self {
        match err {
            header::Error::Conflict(name) => Self::HeaderConflict(name),
            other => Self::MalformedMessage(other.to_string()),
        }
    }
}

/// The reason a key management algorithm rejected a key or an encrypted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum KeyManagementError {
    /// The key has no symmetric key material.
    #[error("the key is not a symmetric `oct` key")]
    NotSymmetric,
    /// The key's `use` or `alg` parameter forbids this algorithm.
    #[error("the key is not allowed for this algorithm")]
    NotAllowed,
    /// An algorithm specific header parameter is missing or invalid.
    #[error("the `{0}` header parameter is missing or invalid")]
    HeaderParameter(&'static str),
    /// The encrypted key has to be empty with direct encryption.
    #[error("unexpected encrypted key")]
    UnexpectedEncryptedKey,
    /// The underlying primitive failed.
    #[error(transparent)]
    Crypto(#[from] crypto::Error),
}
