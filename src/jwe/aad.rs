use alloc::vec::Vec;

use crate::base64_url::Base64UrlString;

/// Computes the additional authenticated data for the content encryption as
/// described in step 14 of [section 5.1 of RFC 7516].
///
/// `protected` is the encoded protected header exactly as it was produced or
/// parsed. With JSON AAD the result is `protected || '.' || BASE64URL(aad)`.
///
/// [section 5.1 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-5.1>
pub fn build_aad(protected: &str, aad: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::from(protected.as_bytes());

    if let Some(aad) = aad {
        out.push(b'.');
        out.extend_from_slice(Base64UrlString::encode(aad).as_bytes());
    }

    out
}
