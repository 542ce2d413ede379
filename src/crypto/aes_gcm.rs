//! AES in Galois/Counter Mode with a 96 bit IV and a 128 bit tag, as used by
//! [section 4.7] and [section 5.3 of RFC 7518].
//!
//! [section 4.7]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.7>
//! [section 5.3 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.3>

use alloc::vec::Vec;

use aes::cipher::generic_array::GenericArray;
use aes_gcm::{
    aead::{consts::U12, AeadInPlace, KeyInit},
    Aes128Gcm, Aes256Gcm,
};

use super::{Error, Result};
use crate::jwa::AesGcm;

/// The length of the initialization vector in bytes.
pub const IV_LEN: usize = 12;
/// The length of the authentication tag in bytes.
pub const TAG_LEN: usize = 16;

type Aes192Gcm = aes_gcm::AesGcm<aes::Aes192, U12>;

enum ErasedCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl ErasedCipher {
    fn new(variant: AesGcm, key: &[u8]) -> Result<Self> {
        if key.len() != variant.key_len() {
            return Err(Error::InvalidLength);
        }

        Ok(match variant {
            AesGcm::Aes128 => Self::Aes128(Aes128Gcm::new_from_slice(key)?),
            AesGcm::Aes192 => Self::Aes192(Aes192Gcm::new_from_slice(key)?),
            AesGcm::Aes256 => Self::Aes256(Aes256Gcm::new_from_slice(key)?),
        })
    }
}

/// Encrypts `plaintext` and returns the ciphertext and the detached tag.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for a key or IV of the wrong size.
pub fn encrypt(
    variant: AesGcm,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = ErasedCipher::new(variant, key)?;
    if iv.len() != IV_LEN {
        return Err(Error::InvalidLength);
    }
    let nonce = GenericArray::from_slice(iv);

    let mut buffer = plaintext.to_vec();
    let tag = match cipher {
        ErasedCipher::Aes128(c) => c.encrypt_in_place_detached(nonce, aad, &mut buffer),
        ErasedCipher::Aes192(c) => c.encrypt_in_place_detached(nonce, aad, &mut buffer),
        ErasedCipher::Aes256(c) => c.encrypt_in_place_detached(nonce, aad, &mut buffer),
    }
    // only fails for plaintexts longer than what GCM can handle
    .map_err(|_| Error::InvalidLength)?;

    Ok((buffer, tag.to_vec()))
}

/// Verifies the tag and decrypts `ciphertext`.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for a key of the wrong size and
/// [`Error::Authentication`] for anything that fails to authenticate,
/// including an IV or tag of the wrong size.
pub fn decrypt(
    variant: AesGcm,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    let cipher = ErasedCipher::new(variant, key)?;
    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(Error::Authentication);
    }
    let nonce = GenericArray::from_slice(iv);
    let tag = GenericArray::from_slice(tag);

    let mut buffer = ciphertext.to_vec();
    match cipher {
        ErasedCipher::Aes128(c) => c.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
        ErasedCipher::Aes192(c) => c.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
        ErasedCipher::Aes256(c) => c.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
    }
    .map_err(|_| Error::Authentication)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64_url;

    #[test]
    fn unwrap_rfc7520_cek() {
        // the GCM key wrap from RFC 7520 section 5.7
        let kek = base64_url::decode("qC57l_uxcm7Nm3K-ct4GFjx8tM1U8CZ0NLBvdQstiS8").unwrap();
        let iv = base64_url::decode("KkYT0GX_2jHlfqN_").unwrap();
        let tag = base64_url::decode("kfPduVQ3T3H6vnewt--ksw").unwrap();
        let encrypted_key =
            base64_url::decode("lJf3HbOApxMEBkCMOoTnnABxs_CvTWUmZQ2ElLvYNok").unwrap();

        let cek = decrypt(AesGcm::Aes256, &kek, &iv, &[], &encrypted_key, &tag).unwrap();
        assert_eq!(
            cek,
            base64_url::decode("UWxARpat23nL9ReIj4WG3D1ee9I4r-Mv5QLuFXdy_rE").unwrap()
        );
    }

    #[test]
    fn tamper() {
        let key = [7u8; 24];
        let iv = [1u8; IV_LEN];
        let (ct, tag) = encrypt(AesGcm::Aes192, &key, &iv, b"aad", b"hello world").unwrap();
        assert_eq!(tag.len(), TAG_LEN);
        assert_eq!(
            decrypt(AesGcm::Aes192, &key, &iv, b"aad", &ct, &tag).unwrap(),
            b"hello world"
        );

        assert_eq!(
            decrypt(AesGcm::Aes192, &key, &iv, b"aaD", &ct, &tag),
            Err(Error::Authentication)
        );
        let mut bad = ct.clone();
        bad[0] ^= 0x80;
        assert_eq!(
            decrypt(AesGcm::Aes192, &key, &iv, b"aad", &bad, &tag),
            Err(Error::Authentication)
        );
        assert_eq!(
            decrypt(AesGcm::Aes192, &key, &iv, b"aad", &ct, &tag[..15]),
            Err(Error::Authentication)
        );
    }

    #[test]
    fn wrong_key_size() {
        assert_eq!(
            encrypt(AesGcm::Aes128, &[0u8; 32], &[0u8; IV_LEN], &[], b"x"),
            Err(Error::InvalidLength)
        );
    }
}
