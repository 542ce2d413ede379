use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};

use super::{malformed, required_tag, Decode, Encode, JweSerializer};
use crate::{
    base64_url::NoBase64UrlString,
    header::ProtectedHeader,
    jwe::{Error, JsonWebEncryption, Recipient},
    Base64UrlString,
};

/// The number of parts of a compact JWE.
const PARTS: usize = 5;

/// The compact representation is essentially a list of Base64Url
/// strings that are separated by `.`.
///
/// For a JWE these are the protected header, the encrypted key, the
/// initialization vector, the ciphertext and the authentication tag.
///
/// # Examples
///
/// ```
/// # use core::str::FromStr;
/// # use jwe::format::Compact;
/// let compact = Compact::from_str("eyJhbGciOiJkaXIifQ..AAAA.BBBB.CCCC").unwrap();
/// assert_eq!(compact.len(), 5);
/// assert_eq!(compact.to_string(), "eyJhbGciOiJkaXIifQ..AAAA.BBBB.CCCC");
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compact {
    parts: Vec<Base64UrlString>,
}

impl Compact {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Compact {
            parts: Vec::with_capacity(cap),
        }
    }

    pub(crate) fn push_base64url(&mut self, part: Base64UrlString) {
        self.parts.push(part);
    }

    pub(crate) fn push(&mut self, part: impl AsRef<[u8]>) {
        self.parts.push(Base64UrlString::encode(part));
    }

    /// The part at `idx`.
    pub fn part(&self, idx: usize) -> Option<&Base64UrlString> {
        self.parts.get(idx)
    }

    /// The number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether there are no parts at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromStr for Compact {
    type Err = NoBase64UrlString;

    /// Verifies if every part of the string is valid base64url format
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('.')
            .map(Base64UrlString::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parts })
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.parts.len();

        for (idx, part) in self.parts.iter().enumerate() {
            fmt::Display::fmt(&part, f)?;

            if idx != len - 1 {
                f.write_str(".")?;
            }
        }

        Ok(())
    }
}

impl Encode<Compact> for &JsonWebEncryption {
    type Error = Error;

    fn encode(self) -> Result<Compact, Self::Error> {
        let [recipient] = self.recipients() else {
            return Err(Error::IncompatibleSerialization(
                "the compact serialization needs exactly one recipient",
            ));
        };
        if self.shared_protected_header().is_empty() {
            return Err(Error::IncompatibleSerialization(
                "the compact serialization needs a protected header",
            ));
        }
        let has_unprotected = self
            .shared_unprotected_header()
            .into_iter()
            .chain(recipient.header())
            .any(|h| !h.is_empty());
        if has_unprotected {
            return Err(Error::IncompatibleSerialization(
                "the compact serialization can not carry unprotected headers",
            ));
        }
        if self.aad().is_some() {
            return Err(Error::IncompatibleSerialization(
                "the compact serialization can not carry additional authenticated data",
            ));
        }

        let mut compact = Compact::with_capacity(PARTS);
        compact.push_base64url(self.protected_header().encoded().clone());
        compact.push(recipient.encrypted_key());
        compact.push(self.iv());
        compact.push(self.ciphertext());
        compact.push(self.tag());

        Ok(compact)
    }
}

impl Decode<Compact> for JsonWebEncryption {
    type Error = Error;

    fn decode(raw: Compact) -> Result<Self, Self::Error> {
        if raw.len() != PARTS {
            return Err(Error::MalformedMessage(alloc::format!(
                "expected {PARTS} parts, found {}",
                raw.len()
            )));
        }

        let mut parts = raw.parts.into_iter();
        let mut next = || parts.next().unwrap_or_default();

        let protected = ProtectedHeader::decode(&next())?;
        let encrypted_key = next().decode();
        let iv = next().decode();
        let ciphertext = next().decode();
        let tag = required_tag(Some(next().decode()))?;

        JsonWebEncryption::new(
            protected,
            None,
            alloc::vec![Recipient::new(None, encrypted_key)],
            iv,
            ciphertext,
            tag,
            None,
        )
    }
}

/// The [`JweSerializer`] for the [`Compact`] serialization, registered as
/// `jwe_compact`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSerializer;

impl CompactSerializer {
    /// The name of this serialization.
    pub const NAME: &'static str = "jwe_compact";
}

impl JweSerializer for CompactSerializer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn serialize(&self, message: &JsonWebEncryption) -> Result<String, Error> {
        let compact = <&JsonWebEncryption as Encode<Compact>>::encode(message)?;
        Ok(alloc::string::ToString::to_string(&compact))
    }

    fn unserialize(&self, input: &str) -> Result<JsonWebEncryption, Error> {
        let compact = Compact::from_str(input.trim()).map_err(malformed)?;
        <JsonWebEncryption as Decode<Compact>>::decode(compact)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::header::HeaderBag;

    fn message(unprotected: Option<HeaderBag>, recipients: Vec<Recipient>) -> JsonWebEncryption {
        let protected =
            ProtectedHeader::encode(HeaderBag::new().with("alg", "A128KW").with("enc", "A128GCM"))
                .unwrap();
        JsonWebEncryption::new(
            protected,
            unprotected,
            recipients,
            vec![1; 12],
            vec![2; 5],
            vec![3; 16],
            None,
        )
        .unwrap()
    }

    #[test]
    fn roundtrip_keeps_protected_encoding() {
        let msg = message(None, vec![Recipient::new(None, vec![4; 24])]);
        let serialized = CompactSerializer.serialize(&msg).unwrap();
        assert_eq!(serialized.split('.').count(), 5);

        let parsed = CompactSerializer.unserialize(&serialized).unwrap();
        assert_eq!(parsed, msg);
        assert_eq!(
            parsed.protected_header().encoded(),
            msg.protected_header().encoded()
        );
    }

    #[test]
    fn empty_encrypted_key() {
        let msg = message(None, vec![Recipient::new(None, vec![])]);
        let serialized = CompactSerializer.serialize(&msg).unwrap();
        assert!(serialized.contains(".."));
        let parsed = CompactSerializer.unserialize(&serialized).unwrap();
        assert!(parsed.recipients()[0].encrypted_key().is_empty());
    }

    #[test]
    fn rejects_what_it_can_not_represent() {
        let two = message(
            None,
            vec![Recipient::new(None, vec![4; 24]), Recipient::new(None, vec![5; 24])],
        );
        assert!(matches!(
            CompactSerializer.serialize(&two),
            Err(Error::IncompatibleSerialization(_))
        ));

        let unprotected = message(
            Some(HeaderBag::new().with("kid", "a")),
            vec![Recipient::new(None, vec![4; 24])],
        );
        assert!(matches!(
            CompactSerializer.serialize(&unprotected),
            Err(Error::IncompatibleSerialization(_))
        ));

        // an empty unprotected header is the same as none
        let empty = message(Some(HeaderBag::new()), vec![Recipient::new(None, vec![4; 24])]);
        assert!(CompactSerializer.serialize(&empty).is_ok());
    }

    #[test]
    fn malformed_input() {
        for input in ["a.b.c", "a.b.c.d.e.f", "eyJhbGciOiJkaXIifQ..!!.AAAA.AAAA", "{}"] {
            assert!(
                matches!(
                    CompactSerializer.unserialize(input),
                    Err(Error::MalformedMessage(_))
                ),
                "{input}"
            );
        }

        // valid base64url, but the header is no JSON object
        let not_json = Base64UrlString::encode("[1,2]");
        let input = alloc::format!("{not_json}..AAAA.AAAA.AAAA");
        assert!(matches!(
            CompactSerializer.unserialize(&input),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn tag_is_required() {
        let msg = message(None, vec![Recipient::new(None, vec![4; 24])]);
        let serialized = CompactSerializer.serialize(&msg).unwrap();
        let (without_tag, _) = serialized.rsplit_once('.').unwrap();

        let input = alloc::format!("{without_tag}.");
        assert!(matches!(
            CompactSerializer.unserialize(&input),
            Err(Error::MalformedMessage(msg)) if msg == "missing `tag`"
        ));
    }
}
