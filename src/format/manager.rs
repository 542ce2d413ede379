use alloc::{boxed::Box, string::String, vec::Vec};

use tracing::trace;

use super::{CompactSerializer, JsonFlattenedSerializer, JsonGeneralSerializer, JweSerializer};
use crate::jwe::{Error, JsonWebEncryption};

/// A list of named serializations.
///
/// # Examples
///
/// ```
/// # use jwe::format::SerializerManager;
/// let manager = SerializerManager::standard();
/// assert_eq!(
///     manager.names().collect::<Vec<_>>(),
///     ["jwe_compact", "jwe_json_flattened", "jwe_json_general"],
/// );
/// ```
#[derive(Debug, Default)]
pub struct SerializerManager {
    serializers: Vec<Box<dyn JweSerializer>>,
}

impl SerializerManager {
    /// Creates a manager without any serializers.
    pub const fn new() -> Self {
        Self {
            serializers: Vec::new(),
        }
    }

    /// Creates a manager with the compact, flattened and general
    /// serializations, in this order.
    pub fn standard() -> Self {
        let mut manager = Self::new();
        manager.add(Box::new(CompactSerializer));
        manager.add(Box::new(JsonFlattenedSerializer));
        manager.add(Box::new(JsonGeneralSerializer));
        manager
    }

    /// Registers another serializer. It is tried after the existing ones by
    /// [`unserialize`](Self::unserialize).
    pub fn add(&mut self, serializer: Box<dyn JweSerializer>) {
        self.serializers.push(serializer);
    }

    /// The names of all registered serializers, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.serializers.iter().map(|s| s.name())
    }

    /// Serializes `message` with the serializer registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSerializer`] if there is no such serializer and
    /// [`Error::IncompatibleSerialization`] if it can not represent the
    /// message.
    pub fn serialize(&self, name: &str, message: &JsonWebEncryption) -> Result<String, Error> {
        let serializer = self
            .serializers
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownSerializer(name.into()))?;

        serializer.serialize(message)
    }

    /// Parses `input` with the first serializer that accepts it and returns
    /// the message together with the name of that serializer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`] if no serializer accepts the input.
    pub fn unserialize(&self, input: &str) -> Result<(JsonWebEncryption, &str), Error> {
        for serializer in &self.serializers {
            match serializer.unserialize(input) {
                Ok(message) => return Ok((message, serializer.name())),
                Err(err) => trace!(serializer = serializer.name(), %err, "not accepted"),
            }
        }

        Err(Error::MalformedMessage(
            "the input matches none of the registered serializations".into(),
        ))
    }
}
