use alloc::vec::Vec;

use super::{Error, HeaderBag};
use crate::base64_url::{self, Base64UrlString};

/// The shared protected header of a JWE together with the exact Base64Url
/// string it was encoded to.
///
/// The encoded string is the input of the additional authenticated data, so it
/// is never re-derived from the parsed [`HeaderBag`] once it exists: a JSON
/// re-encoding may reorder members and would break authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedHeader {
    header: HeaderBag,
    encoded: Base64UrlString,
}

impl ProtectedHeader {
    /// Freezes the given bag by encoding it.
    ///
    /// An empty bag encodes to the empty string, as required by [section 7.2.1
    /// of RFC 7516].
    ///
    /// # Errors
    ///
    /// Fails if the bag can not be serialized to JSON.
    ///
    /// [section 7.2.1 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-7.2.1>
    pub fn encode(header: HeaderBag) -> Result<Self, Error> {
        let encoded = if header.is_empty() {
            Base64UrlString::new()
        } else {
            Base64UrlString::encode(header.to_json_vec()?)
        };

        Ok(Self { header, encoded })
    }

    /// Parses an encoded protected header, keeping the original string.
    ///
    /// # Errors
    ///
    /// Fails if the string is not Base64Url, or does not decode into a JSON
    /// object.
    pub fn decode(encoded: &str) -> Result<Self, Error> {
        let encoded: Base64UrlString = encoded.parse()?;
        let header = if encoded.is_empty() {
            HeaderBag::new()
        } else {
            HeaderBag::from_json_slice(&base64_url::decode(&encoded)?)?
        };

        Ok(Self { header, encoded })
    }

    /// The parsed header parameters.
    pub const fn header(&self) -> &HeaderBag {
        &self.header
    }

    /// The encoded string exactly as it appears on the wire.
    pub const fn encoded(&self) -> &Base64UrlString {
        &self.encoded
    }

    /// The raw JSON bytes of this header.
    pub fn to_json_vec(&self) -> Vec<u8> {
        self.encoded.decode()
    }
}
