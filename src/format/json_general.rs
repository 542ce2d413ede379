use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{is_empty_base64url, malformed, non_empty, required_tag, Decode, Encode, JweSerializer};
use crate::{
    base64_url::Base64UrlBytes,
    header::{HeaderBag, ProtectedHeader},
    jwe::{Error, JsonWebEncryption, Recipient},
    Base64UrlString,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecipientRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) header: Option<HeaderBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) encrypted_key: Option<Base64UrlBytes>,
}

/// The JSON General Serialization format as specified in [Section 7.2.1] in the
/// JWE RFC.
///
/// [Section 7.2.1]: https://datatracker.ietf.org/doc/html/rfc7516#section-7.2.1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonGeneral {
    #[serde(default, skip_serializing_if = "is_empty_base64url")]
    pub(crate) protected: Base64UrlString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) unprotected: Option<HeaderBag>,
    pub(crate) recipients: Vec<RecipientRepr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) aad: Option<Base64UrlBytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) iv: Option<Base64UrlBytes>,
    pub(crate) ciphertext: Base64UrlBytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) tag: Option<Base64UrlBytes>,
}

impl FromStr for JsonGeneral {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for JsonGeneral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = if f.alternate() {
            serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?
        } else {
            serde_json::to_string(&self).map_err(|_| fmt::Error)?
        };

        f.write_str(&repr)
    }
}

fn bytes(value: &[u8]) -> Option<Base64UrlBytes> {
    (!value.is_empty()).then(|| Base64UrlBytes(value.to_vec()))
}

impl Encode<JsonGeneral> for &JsonWebEncryption {
    type Error = Error;

    fn encode(self) -> Result<JsonGeneral, Self::Error> {
        let recipients = self
            .recipients()
            .iter()
            .map(|recipient| RecipientRepr {
                header: non_empty(recipient.header()),
                encrypted_key: bytes(recipient.encrypted_key()),
            })
            .collect();

        Ok(JsonGeneral {
            protected: self.protected_header().encoded().clone(),
            unprotected: non_empty(self.shared_unprotected_header()),
            recipients,
            aad: self.aad().map(|aad| Base64UrlBytes(aad.to_vec())),
            iv: bytes(self.iv()),
            ciphertext: Base64UrlBytes(self.ciphertext().to_vec()),
            tag: bytes(self.tag()),
        })
    }
}

impl Decode<JsonGeneral> for JsonWebEncryption {
    type Error = Error;

    fn decode(raw: JsonGeneral) -> Result<Self, Self::Error> {
        if raw.recipients.is_empty() {
            return Err(Error::MalformedMessage("empty `recipients` array".into()));
        }

        let protected = ProtectedHeader::decode(&raw.protected)?;
        let recipients = raw
            .recipients
            .into_iter()
            .map(|r| Recipient::new(r.header, r.encrypted_key.map(|k| k.0).unwrap_or_default()))
            .collect();

        JsonWebEncryption::new(
            protected,
            raw.unprotected,
            recipients,
            raw.iv.map(|iv| iv.0).unwrap_or_default(),
            raw.ciphertext.0,
            required_tag(raw.tag.map(|tag| tag.0))?,
            raw.aad.map(|aad| aad.0),
        )
    }
}

/// The [`JweSerializer`] for the [`JsonGeneral`] serialization, registered as
/// `jwe_json_general`. It can represent every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGeneralSerializer;

impl JsonGeneralSerializer {
    /// The name of this serialization.
    pub const NAME: &'static str = "jwe_json_general";
}

impl JweSerializer for JsonGeneralSerializer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn serialize(&self, message: &JsonWebEncryption) -> Result<String, Error> {
        let general = <&JsonWebEncryption as Encode<JsonGeneral>>::encode(message)?;
        serde_json::to_string(&general).map_err(malformed)
    }

    fn unserialize(&self, input: &str) -> Result<JsonWebEncryption, Error> {
        let general = JsonGeneral::from_str(input).map_err(malformed)?;
        <JsonWebEncryption as Decode<JsonGeneral>>::decode(general)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn many_recipients() {
        let protected = ProtectedHeader::encode(HeaderBag::new().with("enc", "A256GCM")).unwrap();
        let msg = JsonWebEncryption::new(
            protected,
            None,
            vec![
                Recipient::new(Some(HeaderBag::new().with("alg", "A128KW").with("kid", "1")), vec![1; 24]),
                Recipient::new(Some(HeaderBag::new().with("alg", "A256KW").with("kid", "2")), vec![2; 40]),
                Recipient::new(Some(HeaderBag::new()), vec![3; 40]),
            ],
            vec![0; 12],
            vec![9; 3],
            vec![8; 16],
            None,
        )
        .unwrap();

        let serialized = JsonGeneralSerializer.serialize(&msg).unwrap();
        let value: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(value["recipients"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["recipients"][1]["header"], json!({ "alg": "A256KW", "kid": "2" }));
        // empty headers are left out
        assert!(value["recipients"][2].get("header").is_none());
        assert!(value.get("unprotected").is_none());

        let parsed = JsonGeneralSerializer.unserialize(&serialized).unwrap();
        assert_eq!(parsed.count_recipients(), 3);
        assert_eq!(parsed.recipient(1), msg.recipient(1));
        assert_eq!(parsed.recipient(2).and_then(Recipient::header), None);
        assert_eq!(parsed.ciphertext(), msg.ciphertext());
        assert_eq!(parsed.protected_header(), msg.protected_header());
    }

    #[test]
    fn recipients_are_required() {
        let empty = r#"{"protected":"","recipients":[],"iv":"AAAA","ciphertext":"AAAA","tag":"AAAA"}"#;
        assert!(matches!(
            JsonGeneralSerializer.unserialize(empty),
            Err(Error::MalformedMessage(_))
        ));

        let flattened = r#"{"protected":"","iv":"AAAA","ciphertext":"AAAA","tag":"AAAA"}"#;
        assert!(matches!(
            JsonGeneralSerializer.unserialize(flattened),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn tag_is_required() {
        let input = r#"{"protected":"eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0","recipients":[{}],"iv":"AAAAAAAAAAAAAAAA","ciphertext":"AAAA"}"#;
        assert!(matches!(
            JsonGeneralSerializer.unserialize(input),
            Err(Error::MalformedMessage(msg)) if msg == "missing `tag`"
        ));
    }

    #[test]
    fn header_must_be_an_object() {
        let input = r#"{"unprotected":[1],"recipients":[{}],"ciphertext":"AAAA"}"#;
        assert!(matches!(
            JsonGeneralSerializer.unserialize(input),
            Err(Error::MalformedMessage(_))
        ));
    }
}
