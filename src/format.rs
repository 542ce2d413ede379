//! The three wire serializations of a JWE and the [`SerializerManager`] that
//! picks between them.
//!
//! Every serialization parses into and emits the same
//! [`JsonWebEncryption`]:
//!
//! * [`Compact`]: five Base64Url parts separated by `.`, for messages with a
//!   single recipient and no unprotected data
//! * [`JsonFlattened`]: a JSON object for exactly one recipient
//! * [`JsonGeneral`]: a JSON object with any number of recipients

use alloc::{string::String, vec::Vec};
use core::fmt::Debug;

use crate::{
    header::HeaderBag,
    jwe::{Error, JsonWebEncryption},
    Base64UrlString,
};

mod compact;
mod json_flattened;
mod json_general;
mod manager;

#[doc(inline)]
pub use self::{
    compact::{Compact, CompactSerializer},
    json_flattened::{JsonFlattened, JsonFlattenedSerializer},
    json_general::{JsonGeneral, JsonGeneralSerializer},
    manager::SerializerManager,
};

/// Used to convert any type into the specified format.
pub trait Encode<F> {
    /// The type returned when an error occurred while
    /// encoding `self`.
    type Error;

    /// Performs the encode operation.
    fn encode(self) -> Result<F, Self::Error>;
}

/// Used to parse a [`Compact`], [`JsonFlattened`] or [`JsonGeneral`]
/// representation into a concrete type.
pub trait Decode<F>: Sized {
    /// The type returned when an error occurred while
    /// decoding the raw representation.
    type Error;

    /// Performs the decode operation.
    fn decode(raw: F) -> Result<Self, Self::Error>;
}

/// A named serialization that can be registered in a [`SerializerManager`].
pub trait JweSerializer: Debug + Send + Sync {
    /// The name this serialization is registered under, e.g. `jwe_compact`.
    fn name(&self) -> &str;

    /// Serializes `message` into its textual representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleSerialization`] if the format can not
    /// represent the message.
    fn serialize(&self, message: &JsonWebEncryption) -> Result<String, Error>;

    /// Parses `input` into a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`] if `input` is not a JWE in this
    /// format.
    fn unserialize(&self, input: &str) -> Result<JsonWebEncryption, Error>;
}

/// A header that is present but empty is not written.
fn non_empty(header: Option<&HeaderBag>) -> Option<HeaderBag> {
    header.filter(|h| !h.is_empty()).cloned()
}

fn is_empty_base64url(value: &Base64UrlString) -> bool {
    value.is_empty()
}

/// Every content encryption algorithm produces a tag, so an absent one can
/// never authenticate.
fn required_tag(tag: Option<Vec<u8>>) -> Result<Vec<u8>, Error> {
    tag.filter(|tag| !tag.is_empty())
        .ok_or_else(|| Error::MalformedMessage("missing `tag`".into()))
}

fn malformed(err: impl core::fmt::Display) -> Error {
    Error::MalformedMessage(alloc::string::ToString::to_string(&err))
}
