use alloc::vec::Vec;

use tracing::{debug, instrument};

use super::{
    algorithm::AlgorithmManager, build_aad, Error, JsonWebEncryption, KeyManagementError,
    Recipient,
};
use crate::{
    header::HeaderBag,
    jwk::{JsonWebKey, JsonWebKeySet},
};

/// Decrypts [`JsonWebEncryption`] messages using the algorithms allowed by an
/// [`AlgorithmManager`].
///
/// Every recipient is tried with every key, recipients in document order and
/// keys in the order they were given. Failed attempts are skipped silently
/// and only if all of them fail a single [`Error::DecryptionFailed`] is
/// returned.
#[derive(Debug, Clone, Copy)]
pub struct JweDecrypter<'a> {
    manager: &'a AlgorithmManager,
}

/// A successfully decrypted message.
#[derive(Debug, Clone)]
pub struct Decrypted {
    message: JsonWebEncryption,
    header: HeaderBag,
    recipient: usize,
}

impl Decrypted {
    /// The decrypted (and decompressed) payload.
    pub fn payload(&self) -> &[u8] {
        self.message.payload().unwrap_or_default()
    }

    /// The merged header view of the recipient that was decrypted.
    pub const fn header(&self) -> &HeaderBag {
        &self.header
    }

    /// The index of the recipient that was decrypted.
    pub const fn recipient(&self) -> usize {
        self.recipient
    }

    /// The message, with its payload set.
    pub const fn message(&self) -> &JsonWebEncryption {
        &self.message
    }

    /// Returns the message, with its payload set.
    pub fn into_message(self) -> JsonWebEncryption {
        self.message
    }
}

impl<'a> JweDecrypter<'a> {
    /// Creates a decrypter that only accepts algorithms allowed by `manager`.
    pub const fn new(manager: &'a AlgorithmManager) -> Self {
        Self { manager }
    }

    /// Tries to decrypt `message` with a single key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecryptionFailed`] if no recipient could be decrypted.
    pub fn decrypt_using_key(
        &self,
        message: JsonWebEncryption,
        key: &JsonWebKey,
    ) -> Result<Decrypted, Error> {
        self.decrypt(message, [key])
    }

    /// Tries to decrypt `message` with every key of `set`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecryptionFailed`] if no recipient could be decrypted.
    pub fn decrypt_using_key_set(
        &self,
        message: JsonWebEncryption,
        set: &JsonWebKeySet,
    ) -> Result<Decrypted, Error> {
        self.decrypt(message, set)
    }

    /// Tries to decrypt `message` with the given candidate keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecryptionFailed`] if no recipient could be decrypted
    /// with any of the keys. The reason is not disclosed.
    #[instrument(level = "debug", skip_all, fields(recipients = message.count_recipients()))]
    pub fn decrypt<'k>(
        &self,
        message: JsonWebEncryption,
        keys: impl IntoIterator<Item = &'k JsonWebKey>,
    ) -> Result<Decrypted, Error> {
        let keys: Vec<&JsonWebKey> = keys.into_iter().collect();
        let aad = build_aad(message.protected_header().encoded(), message.aad());

        let mut found = None;
        'recipients: for (index, recipient) in message.recipients().iter().enumerate() {
            for (key_index, key) in keys.iter().enumerate() {
                match self.attempt(&message, recipient, key, &aad) {
                    Ok(result) => {
                        debug!(recipient = index, key = key_index, "decrypted");
                        found = Some((index, result));
                        break 'recipients;
                    }
                    Err(_) => debug!(recipient = index, key = key_index, "attempt failed"),
                }
            }
        }

        let (recipient, (payload, header)) = found.ok_or(Error::DecryptionFailed)?;
        Ok(Decrypted {
            message: message.with_payload(payload),
            header,
            recipient,
        })
    }

    /// A single recipient/key combination.
    fn attempt(
        &self,
        message: &JsonWebEncryption,
        recipient: &Recipient,
        key: &JsonWebKey,
        aad: &[u8],
    ) -> Result<(Vec<u8>, HeaderBag), Error> {
        let header = HeaderBag::merge(
            message.shared_protected_header(),
            message.shared_unprotected_header(),
            recipient.header(),
        )?;
        let alg = header.get_str("alg").ok_or(Error::MissingHeader("alg"))?;
        let enc = header.get_str("enc").ok_or(Error::MissingHeader("enc"))?;

        if !key.allows(alg) {
            return Err(KeyManagementError::NotAllowed.into());
        }
        let key_management = self.manager.key_management(alg)?;
        let content = self.manager.content_encryption(enc)?;

        let compression = match header.get("zip") {
            None => None,
            Some(_) if !message.shared_protected_header().contains("zip") => {
                return Err(Error::UnprotectedParameter("zip"));
            }
            Some(zip) => {
                let token = zip
                    .as_str()
                    .ok_or(Error::UnprotectedParameter("zip"))?;
                Some(self.manager.compression(token)?)
            }
        };

        let cek = key_management.unwrap(recipient.encrypted_key(), key, &header)?;
        let plaintext = content.decrypt(
            &cek,
            message.iv(),
            message.ciphertext(),
            message.tag(),
            aad,
        )?;

        // only authentic data reaches the decompressor
        let payload = match compression {
            Some(method) => method.decompress(&plaintext).map_err(Error::Compression)?,
            None => plaintext,
        };

        Ok((payload, header))
    }
}
