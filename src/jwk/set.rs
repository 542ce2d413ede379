//! This module contains the JWK Set implementation.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::JsonWebKey;

/// A list of [`JsonWebKey`] objects, which is parsed according to [Section
/// 5 of RFC 7517](https://www.rfc-editor.org/rfc/rfc7517#section-5).
///
/// The order of the keys is kept, and it is the order in which a
/// [`JweDecrypter`](crate::jwe::JweDecrypter) tries them.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Creates an empty key set.
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Tries to find the JWK with the given key ID parameter set.
    pub fn find_by_key_id(&self, key_id: &str) -> Option<&JsonWebKey> {
        self.keys
            .iter()
            .find(|key| key.key_id().is_some_and(|id| id == key_id))
    }

    /// Appends a key to the end of this set.
    pub fn push(&mut self, key: JsonWebKey) {
        self.keys.push(key);
    }

    /// Returns an iterator over all the JWKs in this set.
    pub fn iter(&self) -> impl Iterator<Item = &JsonWebKey> {
        self.keys.iter()
    }

    /// All keys as a slice.
    pub fn keys(&self) -> &[JsonWebKey] {
        &self.keys
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether this set has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> IntoIterator for &'a JsonWebKeySet {
    type IntoIter = core::slice::Iter<'a, JsonWebKey>;
    type Item = &'a JsonWebKey;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl IntoIterator for JsonWebKeySet {
    type IntoIter = alloc::vec::IntoIter<Self::Item>;
    type Item = JsonWebKey;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl From<Vec<JsonWebKey>> for JsonWebKeySet {
    fn from(keys: Vec<JsonWebKey>) -> Self {
        Self { keys }
    }
}

impl FromIterator<JsonWebKey> for JsonWebKeySet {
    fn from_iter<T: IntoIterator<Item = JsonWebKey>>(iter: T) -> Self {
        let keys = iter.into_iter().collect();
        Self { keys }
    }
}
