//! JOSE header parameters of a JWE as defined in [section 4 of RFC 7516].
//!
//! A JWE carries its header parameters in up to three places: the shared
//! protected header, the shared unprotected header and the per-recipient
//! header. Each of them is represented by a [`HeaderBag`]; the protected
//! header is additionally wrapped in a [`ProtectedHeader`] that remembers its
//! exact encoding.
//!
//! [section 4 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-4>

use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod error;
mod protected;

#[doc(inline)]
pub use self::{error::Error, protected::ProtectedHeader};

/// An ordered mapping from header parameter names to JSON values.
///
/// With the `std` feature the insertion order is kept (through
/// `serde_json/preserve_order`), which makes encoding deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderBag(Map<String, Value>);

impl HeaderBag {
    /// Creates an empty header bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds a parameter, replacing any previous value of the same name.
    ///
    /// ```
    /// # use jwe::HeaderBag;
    /// let header = HeaderBag::new().with("alg", "A128KW").with("enc", "A128GCM");
    /// assert_eq!(header.get_str("enc"), Some("A128GCM"));
    /// ```
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Inserts a parameter and returns the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Returns the value of the parameter `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the value of the parameter `name` if it is a JSON string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Whether the parameter `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over all parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Resolves the complete header view of one recipient.
    ///
    /// The result contains the union of all three sources. A parameter may
    /// show up in more than one of them as long as the values are equal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] for a parameter that is defined with
    /// different values.
    pub fn merge(
        protected: &HeaderBag,
        unprotected: Option<&HeaderBag>,
        recipient: Option<&HeaderBag>,
    ) -> Result<HeaderBag, Error> {
        let mut merged = protected.clone();

        for bag in [unprotected, recipient].into_iter().flatten() {
            for (name, value) in &bag.0 {
                match merged.0.get(name) {
                    Some(existing) if existing != value => {
                        return Err(Error::Conflict(name.clone()));
                    }
                    Some(_) => {}
                    None => {
                        merged.0.insert(name.clone(), value.clone());
                    }
                }
            }
        }

        Ok(merged)
    }

    /// Checks that `self` and `other` have no parameter name in common.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] with the first shared name.
    pub fn ensure_disjoint(&self, other: &HeaderBag) -> Result<(), Error> {
        match self.names().find(|name| other.contains(name)) {
            Some(name) => Err(Error::Conflict(name.into())),
            None => Ok(()),
        }
    }

    /// Parses a header bag from the JSON bytes of an object.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not JSON or not a JSON object.
    pub fn from_json_slice(json: &[u8]) -> Result<Self, Error> {
        match serde_json::from_slice::<Value>(json)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::NotAnObject),
        }
    }

    /// Serializes this bag to compact JSON.
    ///
    /// # Errors
    ///
    /// Forwards errors of [`serde_json::to_vec`].
    pub fn to_json_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(&self.0)?)
    }
}

impl From<Map<String, Value>> for HeaderBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for HeaderBag {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::NotAnObject),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for HeaderBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for HeaderBag {
    type IntoIter = serde_json::map::IntoIter;
    type Item = (String, Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
