//! JSON Web Keys as defined in [RFC 7517].
//!
//! Only symmetric (`kty: oct`) keys carry key material that the algorithms in
//! this crate can use. Keys of any other type still parse, so that a
//! [`JsonWebKeySet`] obtained from somewhere else can be used as a whole.
//!
//! [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>

use alloc::string::String;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod key_use;
mod set;
mod symmetric;

#[doc(inline)]
pub use self::{key_use::KeyUsage, set::JsonWebKeySet, symmetric::OctetSequence};
use crate::base64_url::SecretBase64UrlBytes;

/// A JSON Web Key as defined in [RFC 7517].
///
/// [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWebKey {
    /// `kty` and the type specific parameters
    key_type: JsonWebKeyType,
    /// `use` parameter section 4.2
    key_use: Option<KeyUsage>,
    /// `alg` parameter section 4.4
    // kept as a plain string, a JWK may name algorithms this crate does not
    // know about
    algorithm: Option<String>,
    /// `kid` parameter section 4.5
    key_id: Option<String>,
}

/// The type of a [`JsonWebKey`], the `kty` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum JsonWebKeyType {
    /// `oct` <https://datatracker.ietf.org/doc/html/rfc7518#section-6.4>
    Symmetric(OctetSequence),
    /// Any other key type. The key material is not retained.
    Other(String),
}

impl JsonWebKey {
    /// Creates a new JWK with the given key type and no other parameters.
    pub const fn new(key_type: JsonWebKeyType) -> Self {
        Self {
            key_type,
            key_use: None,
            algorithm: None,
            key_id: None,
        }
    }

    /// Creates a `kty: oct` key from raw bytes.
    pub fn from_octets(k: impl Into<alloc::vec::Vec<u8>>) -> Self {
        Self::new(JsonWebKeyType::Symmetric(OctetSequence::new(k)))
    }

    /// Sets the `kid` parameter.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Sets the `use` parameter.
    #[must_use]
    pub fn with_key_use(mut self, key_use: KeyUsage) -> Self {
        self.key_use = Some(key_use);
        self
    }

    /// Sets the `alg` parameter.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// The key type and its material.
    pub const fn key_type(&self) -> &JsonWebKeyType {
        &self.key_type
    }

    /// The `kid` parameter.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The `use` parameter.
    pub const fn key_use(&self) -> Option<&KeyUsage> {
        self.key_use.as_ref()
    }

    /// The `alg` parameter.
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// The symmetric key material if this is a `kty: oct` key.
    pub const fn octet_sequence(&self) -> Option<&OctetSequence> {
        match &self.key_type {
            JsonWebKeyType::Symmetric(k) => Some(k),
            JsonWebKeyType::Other(_) => None,
        }
    }

    /// Whether this key may be used with the key management algorithm `alg`.
    ///
    /// A key is allowed unless its `use` is something other than `enc`, or its
    /// `alg` names a different algorithm.
    pub fn allows(&self, alg: &str) -> bool {
        let use_ok = matches!(self.key_use, None | Some(KeyUsage::Encryption));
        let alg_ok = self.algorithm.as_deref().map_or(true, |a| a == alg);
        use_ok && alg_ok
    }
}

impl From<OctetSequence> for JsonWebKey {
    fn from(x: OctetSequence) -> Self {
        Self::new(JsonWebKeyType::Symmetric(x))
    }
}

#[derive(Deserialize)]
struct Repr {
    kty: String,
    #[serde(default, rename = "use")]
    key_use: Option<KeyUsage>,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    k: Option<SecretBase64UrlBytes>,
}

#[derive(Serialize)]
struct ReprRef<'a> {
    kty: &'a str,
    #[serde(skip_serializing_if = "Option::is_none", rename = "use")]
    key_use: Option<&'a KeyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alg: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<&'a SecretBase64UrlBytes>,
}

impl<'de> Deserialize<'de> for JsonWebKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let repr = Repr::deserialize(deserializer)?;
        let key_type = match repr.kty.as_str() {
            "oct" => {
                let k = repr
                    .k
                    .ok_or_else(|| D::Error::missing_field("k"))?;
                JsonWebKeyType::Symmetric(OctetSequence(k))
            }
            _ => JsonWebKeyType::Other(repr.kty),
        };

        Ok(Self {
            key_type,
            key_use: repr.key_use,
            algorithm: repr.alg,
            key_id: repr.kid,
        })
    }
}

impl Serialize for JsonWebKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (kty, k) = match &self.key_type {
            JsonWebKeyType::Symmetric(k) => ("oct", Some(&k.0)),
            JsonWebKeyType::Other(kty) => (kty.as_str(), None),
        };

        ReprRef {
            kty,
            key_use: self.key_use.as_ref(),
            alg: self.algorithm.as_deref(),
            kid: self.key_id.as_deref(),
            k,
        }
        .serialize(serializer)
    }
}
