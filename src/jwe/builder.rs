use alloc::{string::ToString, vec::Vec};

use secrecy::ExposeSecret as _;
use tracing::{debug, instrument};

use super::{
    algorithm::{AlgorithmManager, ContentEncryptionKey, KeyManagement, KeyManagementMode},
    build_aad, Error, JsonWebEncryption, KeyManagementError, Recipient,
};
use crate::{
    compression::Compression,
    crypto,
    header::{HeaderBag, ProtectedHeader},
    jwk::JsonWebKey,
};

/// Creates [`JsonWebEncryption`] messages using the algorithms allowed by an
/// [`AlgorithmManager`].
///
/// ```
/// # use jwe::{HeaderBag, jwe::{JweBuilder, algorithm::AlgorithmManager}, jwk::JsonWebKey};
/// let manager = AlgorithmManager::with_allowed(["A128KW"], ["A128GCM"], None::<&str>).unwrap();
/// let key = JsonWebKey::from_octets([0x42; 16]);
///
/// let jwe = JweBuilder::new(&manager)
///     .create()
///     .with_payload("Live long and prosper.")
///     .with_shared_protected_headers(HeaderBag::new().with("alg", "A128KW").with("enc", "A128GCM"))
///     .add_recipient(&key, None)
///     .build()
///     .unwrap();
///
/// assert_eq!(jwe.count_recipients(), 1);
/// assert!(jwe.payload().is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JweBuilder<'a> {
    manager: &'a AlgorithmManager,
}

impl<'a> JweBuilder<'a> {
    /// Creates a builder that only uses algorithms allowed by `manager`.
    pub const fn new(manager: &'a AlgorithmManager) -> Self {
        Self { manager }
    }

    /// Begins a new message.
    pub fn create(&self) -> JweDraft<'a> {
        JweDraft {
            manager: self.manager,
            payload: None,
            protected: HeaderBag::new(),
            unprotected: None,
            aad: None,
            recipients: Vec::new(),
        }
    }
}

/// A message under construction, see [`JweBuilder::create`].
#[derive(Debug)]
pub struct JweDraft<'a> {
    manager: &'a AlgorithmManager,
    payload: Option<Vec<u8>>,
    protected: HeaderBag,
    unprotected: Option<HeaderBag>,
    aad: Option<Vec<u8>>,
    recipients: Vec<(JsonWebKey, Option<HeaderBag>)>,
}

/// A recipient whose algorithm has been resolved.
struct PreparedRecipient<'m> {
    key: JsonWebKey,
    header: Option<HeaderBag>,
    resolved: HeaderBag,
    algorithm: &'m dyn KeyManagement,
}

impl<'a> JweDraft<'a> {
    /// Sets the plaintext.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the shared protected header. It usually carries `alg`, `enc` and
    /// `zip`.
    #[must_use]
    pub fn with_shared_protected_headers(mut self, header: HeaderBag) -> Self {
        self.protected = header;
        self
    }

    /// Sets the shared unprotected header.
    #[must_use]
    pub fn with_shared_unprotected_headers(mut self, header: HeaderBag) -> Self {
        self.unprotected = Some(header);
        self
    }

    /// Sets additional authenticated data. Messages with AAD can only be
    /// represented in the JSON serializations.
    #[must_use]
    pub fn with_aad(mut self, aad: impl Into<Vec<u8>>) -> Self {
        self.aad = Some(aad.into());
        self
    }

    /// Adds a recipient that will be able to decrypt the message with `key`.
    #[must_use]
    pub fn add_recipient(mut self, key: &JsonWebKey, header: Option<HeaderBag>) -> Self {
        self.recipients.push((key.clone(), header));
        self
    }

    /// Encrypts the payload and produces the message.
    ///
    /// The content is encrypted exactly once; only the wrapping of the CEK is
    /// done per recipient.
    ///
    /// # Errors
    ///
    /// Fails if there is no payload or recipient, if headers conflict, if an
    /// algorithm is not allowed or if a key does not fit its algorithm.
    #[instrument(level = "debug", skip_all, fields(recipients = self.recipients.len()))]
    pub fn build(self) -> Result<JsonWebEncryption, Error> {
        let payload = self.payload.ok_or(Error::MissingPayload)?;
        if self.recipients.is_empty() {
            return Err(Error::NoRecipients);
        }
        let mut protected = self.protected;
        let unprotected = self.unprotected;
        let manager = self.manager;

        if let Some(unprotected) = &unprotected {
            protected.ensure_disjoint(unprotected)?;
        }
        for header in self.recipients.iter().filter_map(|(_, h)| h.as_ref()) {
            protected.ensure_disjoint(header)?;
            if let Some(unprotected) = &unprotected {
                unprotected.ensure_disjoint(header)?;
            }
        }

        let shared = HeaderBag::merge(&protected, unprotected.as_ref(), None)?;
        let enc = shared.get_str("enc").ok_or(Error::MissingHeader("enc"))?;
        let content = manager.content_encryption(enc)?;
        let compression =
            compression_method(manager, &protected, unprotected.as_ref(), &self.recipients)?;

        let recipients = self
            .recipients
            .into_iter()
            .map(|(key, header)| -> Result<PreparedRecipient<'a>, Error> {
                let resolved =
                    HeaderBag::merge(&protected, unprotected.as_ref(), header.as_ref())?;
                let alg = resolved.get_str("alg").ok_or(Error::MissingHeader("alg"))?;
                let algorithm = manager.key_management(alg)?;
                if !key.allows(alg) {
                    return Err(KeyManagementError::NotAllowed.into());
                }

                Ok(PreparedRecipient {
                    key,
                    header,
                    resolved,
                    algorithm,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let direct = recipients
            .iter()
            .find(|r| r.algorithm.mode() == KeyManagementMode::DirectEncryption);
        let cek = match direct {
            Some(_) if recipients.len() > 1 => return Err(Error::IncompatibleDirectMode),
            Some(r) => {
                let cek = r.algorithm.derive_key(&r.key, &r.resolved)?;
                if cek.expose_secret().len() != content.key_len() {
                    return Err(KeyManagementError::Crypto(crypto::Error::InvalidLength).into());
                }
                cek
            }
            None => ContentEncryptionKey::from(
                crypto::random_bytes(content.key_len()).map_err(Error::Crypto)?,
            ),
        };

        let count = recipients.len();
        let mut finished = Vec::with_capacity(count);
        for (index, recipient) in recipients.into_iter().enumerate() {
            let wrapped = recipient
                .algorithm
                .wrap(&cek, &recipient.key, &recipient.resolved)?;
            debug!(
                recipient = index,
                alg = %recipient.algorithm.algorithm(),
                extra_parameters = wrapped.header.len(),
                "wrapped content encryption key"
            );

            let mut header = recipient.header;
            place_parameters(
                wrapped.header,
                &mut protected,
                unprotected.as_ref(),
                &mut header,
                count,
            )?;
            finished.push(Recipient::new(header, wrapped.encrypted_key));
        }

        let protected = ProtectedHeader::encode(protected)?;
        let iv = crypto::random_bytes(content.iv_len()).map_err(Error::Crypto)?;
        let plaintext = match compression {
            Some(method) => method.compress(&payload).map_err(Error::Compression)?,
            None => payload,
        };
        let aad = build_aad(protected.encoded(), self.aad.as_deref());

        let (ciphertext, tag) = content.encrypt(&cek, &iv, &plaintext, &aad)?;
        debug!(enc = %content.algorithm(), "encrypted content");

        Ok(JsonWebEncryption {
            protected,
            unprotected,
            recipients: finished,
            iv,
            ciphertext,
            tag,
            aad: self.aad,
            payload: None,
        })
    }
}

/// Resolves the `zip` method, which is only honored in the protected header.
fn compression_method<'m>(
    manager: &'m AlgorithmManager,
    protected: &HeaderBag,
    unprotected: Option<&HeaderBag>,
    recipients: &[(JsonWebKey, Option<HeaderBag>)],
) -> Result<Option<&'m dyn Compression>, Error> {
    let elsewhere = unprotected.is_some_and(|h| h.contains("zip"))
        || recipients
            .iter()
            .any(|(_, h)| h.as_ref().is_some_and(|h| h.contains("zip")));
    if elsewhere {
        return Err(Error::UnprotectedParameter("zip"));
    }

    match protected.get("zip") {
        None => Ok(None),
        Some(zip) => {
            let token = zip
                .as_str()
                .ok_or_else(|| Error::UnsupportedAlgorithm(zip.to_string()))?;
            Ok(Some(manager.compression(token)?))
        }
    }
}

/// Puts the header parameters a key management algorithm produced into the
/// header they belong to.
///
/// They go into the recipient's own header if there is one, otherwise into
/// the protected header as long as there is only one recipient. Several
/// recipients without own headers each get a fresh one.
fn place_parameters(
    parameters: HeaderBag,
    protected: &mut HeaderBag,
    unprotected: Option<&HeaderBag>,
    recipient: &mut Option<HeaderBag>,
    recipient_count: usize,
) -> Result<(), Error> {
    if parameters.is_empty() {
        return Ok(());
    }

    if let Some(header) = recipient.as_mut() {
        return insert_parameters(parameters, header, [Some(&*protected), unprotected]);
    }
    if recipient_count == 1 {
        return insert_parameters(parameters, protected, [unprotected, None]);
    }

    let header = recipient.insert(HeaderBag::new());
    insert_parameters(parameters, header, [Some(&*protected), unprotected])
}

fn insert_parameters(
    parameters: HeaderBag,
    target: &mut HeaderBag,
    others: [Option<&HeaderBag>; 2],
) -> Result<(), Error> {
    for (name, value) in parameters {
        let taken = target.contains(&name)
            || others.iter().flatten().any(|other| other.contains(&name));
        if taken {
            return Err(Error::HeaderConflict(name));
        }
        target.insert(name, value);
    }

    Ok(())
}
