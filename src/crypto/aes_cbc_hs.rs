//! The composite AES-CBC with HMAC-SHA2 authenticated encryption from
//! [section 5.2 of RFC 7518].
//!
//! The key is split in two halves: the first one is the MAC key, the second
//! one the AES key. The tag is the first half of
//! `HMAC(AAD || IV || ciphertext || AL)` where `AL` is the bit length of the
//! AAD as a 64 bit big endian integer.
//!
//! [section 5.2 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.2>

use alloc::vec::Vec;

use aes::{
    cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit},
    Aes128, Aes192, Aes256,
};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq as _;

use super::{Error, Result};
use crate::jwa::AesCbcHs;

/// The length of the initialization vector in bytes, one AES block.
pub const IV_LEN: usize = 16;

/// Rust crypto uses generic arguments to represent the variant.
///
/// We don't to that at this level, so we have to erase the type.
enum ErasedMac {
    Hs256(Hmac<Sha256>),
    Hs384(Hmac<Sha384>),
    Hs512(Hmac<Sha512>),
}

impl ErasedMac {
    fn new(variant: AesCbcHs, key: &[u8]) -> Result<Self> {
        Ok(match variant {
            AesCbcHs::Aes128CbcHs256 => Self::Hs256(<Hmac<Sha256> as Mac>::new_from_slice(key)?),
            AesCbcHs::Aes192CbcHs384 => Self::Hs384(<Hmac<Sha384> as Mac>::new_from_slice(key)?),
            AesCbcHs::Aes256CbcHs512 => Self::Hs512(<Hmac<Sha512> as Mac>::new_from_slice(key)?),
        })
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Hs256(mac) => mac.update(data),
            Self::Hs384(mac) => mac.update(data),
            Self::Hs512(mac) => mac.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Hs256(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Hs384(mac) => mac.finalize().into_bytes().to_vec(),
            Self::Hs512(mac) => mac.finalize().into_bytes().to_vec(),
        }
    }
}

fn split_key(variant: AesCbcHs, key: &[u8]) -> Result<(&[u8], &[u8])> {
    if key.len() != variant.key_len() {
        return Err(Error::InvalidLength);
    }

    Ok(key.split_at(key.len() / 2))
}

fn authentication_tag(
    variant: AesCbcHs,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let aad_bits = (aad.len() as u64).wrapping_mul(8);

    let mut mac = ErasedMac::new(variant, mac_key)?;
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&aad_bits.to_be_bytes());

    let mut tag = mac.finalize();
    tag.truncate(variant.tag_len());
    Ok(tag)
}

/// Encrypts `plaintext` and returns the ciphertext and the tag.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] if the key does not have the length of the
/// variant or the IV is not 16 bytes.
pub fn encrypt(
    variant: AesCbcHs,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let (mac_key, enc_key) = split_key(variant, key)?;
    if iv.len() != IV_LEN {
        return Err(Error::InvalidLength);
    }

    let ciphertext = match variant {
        AesCbcHs::Aes128CbcHs256 => cbc::Encryptor::<Aes128>::new_from_slices(enc_key, iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        AesCbcHs::Aes192CbcHs384 => cbc::Encryptor::<Aes192>::new_from_slices(enc_key, iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        AesCbcHs::Aes256CbcHs512 => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };
    let tag = authentication_tag(variant, mac_key, aad, iv, &ciphertext)?;

    Ok((ciphertext, tag))
}

/// Verifies the tag in constant time and only then decrypts `ciphertext`.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] for a key of the wrong size,
/// [`Error::Authentication`] if the tag does not verify (which includes IVs
/// and tags of the wrong size), and [`Error::Padding`] for an authentic
/// message with invalid padding.
pub fn decrypt(
    variant: AesCbcHs,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    let (mac_key, enc_key) = split_key(variant, key)?;
    if iv.len() != IV_LEN {
        return Err(Error::Authentication);
    }

    let expected = authentication_tag(variant, mac_key, aad, iv, ciphertext)?;
    // `ct_eq` on slices of different length is false
    if !bool::from(expected.ct_eq(tag)) {
        return Err(Error::Authentication);
    }

    if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
        return Err(Error::Padding);
    }

    let plaintext = match variant {
        AesCbcHs::Aes128CbcHs256 => cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        AesCbcHs::Aes192CbcHs384 => cbc::Decryptor::<Aes192>::new_from_slices(enc_key, iv)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        AesCbcHs::Aes256CbcHs512 => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    };

    plaintext.map_err(|_| Error::Padding)
}
