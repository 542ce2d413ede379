use alloc::{string::String, vec};
use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{is_empty_base64url, malformed, non_empty, required_tag, Decode, Encode, JweSerializer};
use crate::{
    base64_url::Base64UrlBytes,
    header::{HeaderBag, ProtectedHeader},
    jwe::{Error, JsonWebEncryption, Recipient},
    Base64UrlString,
};

/// The JSON Flattened Serialization as specified in [section 7.2.2 of RFC
/// 7516].
///
/// It is the JSON General Serialization reduced to a single recipient, whose
/// `header` and `encrypted_key` are members of the top level object.
///
/// [section 7.2.2 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-7.2.2>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFlattened {
    #[serde(default, skip_serializing_if = "is_empty_base64url")]
    pub(crate) protected: Base64UrlString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) unprotected: Option<HeaderBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) header: Option<HeaderBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) encrypted_key: Option<Base64UrlBytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) aad: Option<Base64UrlBytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) iv: Option<Base64UrlBytes>,
    pub(crate) ciphertext: Base64UrlBytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) tag: Option<Base64UrlBytes>,
    // a `recipients` member means this is a general serialization
    #[serde(default, skip_serializing)]
    recipients: Option<serde_json::Value>,
}

impl FromStr for JsonFlattened {
    type Err = serde_json::Error;

    /// The from_str implementation will parse the supplied
    /// string as JSON.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for JsonFlattened {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = if f.alternate() {
            serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?
        } else {
            serde_json::to_string(&self).map_err(|_| fmt::Error)?
        };

        f.write_str(&repr)
    }
}

/// Absent and empty byte strings are the same on the wire.
fn bytes(value: &[u8]) -> Option<Base64UrlBytes> {
    (!value.is_empty()).then(|| Base64UrlBytes(value.to_vec()))
}

impl Encode<JsonFlattened> for &JsonWebEncryption {
    type Error = Error;

    fn encode(self) -> Result<JsonFlattened, Self::Error> {
        let [recipient] = self.recipients() else {
            return Err(Error::IncompatibleSerialization(
                "the flattened serialization needs exactly one recipient",
            ));
        };

        Ok(JsonFlattened {
            protected: self.protected_header().encoded().clone(),
            unprotected: non_empty(self.shared_unprotected_header()),
            header: non_empty(recipient.header()),
            encrypted_key: bytes(recipient.encrypted_key()),
            aad: self.aad().map(|aad| Base64UrlBytes(aad.to_vec())),
            iv: bytes(self.iv()),
            ciphertext: Base64UrlBytes(self.ciphertext().to_vec()),
            tag: bytes(self.tag()),
            recipients: None,
        })
    }
}

impl Decode<JsonFlattened> for JsonWebEncryption {
    type Error = Error;

    fn decode(raw: JsonFlattened) -> Result<Self, Self::Error> {
        if raw.recipients.is_some() {
            return Err(Error::MalformedMessage(
                "a flattened serialization has no `recipients` member".into(),
            ));
        }

        let protected = ProtectedHeader::decode(&raw.protected)?;
        let recipient = Recipient::new(
            raw.header,
            raw.encrypted_key.map(|k| k.0).unwrap_or_default(),
        );

        JsonWebEncryption::new(
            protected,
            raw.unprotected,
            vec![recipient],
            raw.iv.map(|iv| iv.0).unwrap_or_default(),
            raw.ciphertext.0,
            required_tag(raw.tag.map(|tag| tag.0))?,
            raw.aad.map(|aad| aad.0),
        )
    }
}

/// The [`JweSerializer`] for the [`JsonFlattened`] serialization, registered
/// as `jwe_json_flattened`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFlattenedSerializer;

impl JsonFlattenedSerializer {
    /// The name of this serialization.
    pub const NAME: &'static str = "jwe_json_flattened";
}

impl JweSerializer for JsonFlattenedSerializer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn serialize(&self, message: &JsonWebEncryption) -> Result<String, Error> {
        let flattened = <&JsonWebEncryption as Encode<JsonFlattened>>::encode(message)?;
        serde_json::to_string(&flattened).map_err(malformed)
    }

    fn unserialize(&self, input: &str) -> Result<JsonWebEncryption, Error> {
        let flattened = JsonFlattened::from_str(input).map_err(malformed)?;
        <JsonWebEncryption as Decode<JsonFlattened>>::decode(flattened)
    }
}
