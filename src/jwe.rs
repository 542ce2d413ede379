//! Implementation of JSON Web Encryption (JWE) as defined in [RFC 7516]
//!
//! [`JsonWebEncryption`] is the canonical in-memory form of an encrypted
//! message. It is created by a [`JweBuilder`] or by one of the serializers in
//! [`format`](crate::format), and consumed by a [`JweDecrypter`].
//!
//! [RFC 7516]: <https://www.rfc-editor.org/rfc/rfc7516.html>

use alloc::vec::Vec;

use crate::header::{HeaderBag, ProtectedHeader};

mod aad;
pub mod algorithm;
mod builder;
mod decrypt;
mod error;

#[doc(inline)]
pub use self::{
    aad::build_aad,
    builder::{JweBuilder, JweDraft},
    decrypt::{Decrypted, JweDecrypter},
    error::{Error, KeyManagementError},
};

/// One recipient of a [`JsonWebEncryption`]: the per-recipient header and the
/// content encryption key encrypted for this recipient.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recipient {
    header: Option<HeaderBag>,
    encrypted_key: Vec<u8>,
}

impl Recipient {
    /// Creates a recipient. The encrypted key is empty for direct key
    /// management algorithms.
    pub const fn new(header: Option<HeaderBag>, encrypted_key: Vec<u8>) -> Self {
        Self {
            header,
            encrypted_key,
        }
    }

    /// The per-recipient unprotected header.
    pub const fn header(&self) -> Option<&HeaderBag> {
        self.header.as_ref()
    }

    /// The JWE Encrypted Key.
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }
}

/// An encrypted JWE message.
///
/// The protected header is kept together with its exact encoding, which is
/// what the authentication tag covers. None of the fields can be modified
/// once the message exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWebEncryption {
    protected: ProtectedHeader,
    unprotected: Option<HeaderBag>,
    recipients: Vec<Recipient>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
    aad: Option<Vec<u8>>,
    payload: Option<Vec<u8>>,
}

impl JsonWebEncryption {
    /// Assembles a message from its parts, e.g. after parsing a serialization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRecipients`] if `recipients` is empty.
    pub fn new(
        protected: ProtectedHeader,
        unprotected: Option<HeaderBag>,
        recipients: Vec<Recipient>,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
        aad: Option<Vec<u8>>,
    ) -> Result<Self, Error> {
        if recipients.is_empty() {
            return Err(Error::NoRecipients);
        }

        Ok(Self {
            protected,
            unprotected,
            recipients,
            iv,
            ciphertext,
            tag,
            aad,
            payload: None,
        })
    }

    /// The shared protected header with its encoding.
    pub const fn protected_header(&self) -> &ProtectedHeader {
        &self.protected
    }

    /// The parameters of the shared protected header.
    pub const fn shared_protected_header(&self) -> &HeaderBag {
        self.protected.header()
    }

    /// The shared unprotected header.
    pub const fn shared_unprotected_header(&self) -> Option<&HeaderBag> {
        self.unprotected.as_ref()
    }

    /// All recipients in document order. There is at least one.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// The recipient at `index`.
    pub fn recipient(&self, index: usize) -> Option<&Recipient> {
        self.recipients.get(index)
    }

    /// The number of recipients.
    pub fn count_recipients(&self) -> usize {
        self.recipients.len()
    }

    /// The initialization vector. Empty if the algorithm uses none.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The authentication tag.
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// The additional authenticated data, only representable in the JSON
    /// serializations.
    pub fn aad(&self) -> Option<&[u8]> {
        self.aad.as_deref()
    }

    /// The decrypted payload. `None` unless this message came out of a
    /// successful decryption, `Some` with an empty slice for an empty payload.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// The complete header view of the recipient at `index`, merged from the
    /// shared protected, shared unprotected and per-recipient headers.
    ///
    /// Returns [`None`] if there is no recipient at `index`, and
    /// [`Error::HeaderConflict`] if a parameter has different values in
    /// different headers.
    pub fn resolved_header(&self, index: usize) -> Option<Result<HeaderBag, Error>> {
        let recipient = self.recipients.get(index)?;
        let merged = HeaderBag::merge(
            self.protected.header(),
            self.unprotected.as_ref(),
            recipient.header(),
        );
        Some(merged.map_err(Error::from))
    }

    pub(crate) fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }
}
