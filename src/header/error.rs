use alloc::string::String;

/// Errors that may occur while working with a [`HeaderBag`](super::HeaderBag)
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The same header parameter appears in more than one source with
    /// different values, or in two sources that have to be disjoint.
    #[error("header parameter `{0}` is defined more than once")]
    Conflict(String),
    /// The `protected` or (unprotected) `header` member is not a JSON object.
    #[error("header is not a JSON object")]
    NotAnObject,
    /// The protected header is not valid Base64Url.
    #[error(transparent)]
    Base64(#[from] crate::base64_url::NoBase64UrlString),
    /// A JSON deserialization error, see [`serde_json::Error`] for details.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}
