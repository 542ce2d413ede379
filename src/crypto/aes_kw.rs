//! AES Key Wrap as defined in [RFC 3394].
//!
//! [RFC 3394]: <https://datatracker.ietf.org/doc/html/rfc3394>

use alloc::vec::Vec;

use aes::cipher::generic_array::GenericArray;
use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroizing;

use super::{Error, Result};
use crate::jwa::AesKw;

/// The size of the integrity check block that is added by wrapping.
const IV_LEN: usize = 8;

/// `aes-kw` uses generic arguments to represent the variant, so the type is
/// erased here.
enum ErasedKek {
    Aes128(KekAes128),
    Aes192(KekAes192),
    Aes256(KekAes256),
}

impl ErasedKek {
    fn new(variant: AesKw, kek: &[u8]) -> Result<Self> {
        if kek.len() != variant.key_len() {
            return Err(Error::InvalidLength);
        }

        Ok(match variant {
            AesKw::Aes128 => Self::Aes128(KekAes128::new(GenericArray::from_slice(kek))),
            AesKw::Aes192 => Self::Aes192(KekAes192::new(GenericArray::from_slice(kek))),
            AesKw::Aes256 => Self::Aes256(KekAes256::new(GenericArray::from_slice(kek))),
        })
    }
}

/// Wraps `cek` with the key encryption key `kek`.
///
/// The CEK has to be a multiple of 8 bytes and at least 16 bytes long.
///
/// # Errors
///
/// Returns [`Error::InvalidLength`] if the KEK does not match the variant, or
/// the CEK has an invalid length.
pub fn wrap(variant: AesKw, kek: &[u8], cek: &[u8]) -> Result<Vec<u8>> {
    if cek.len() < 16 || cek.len() % 8 != 0 {
        return Err(Error::InvalidLength);
    }

    let mut out = alloc::vec![0u8; cek.len() + IV_LEN];
    let res = match ErasedKek::new(variant, kek)? {
        ErasedKek::Aes128(k) => k.wrap(cek, &mut out),
        ErasedKek::Aes192(k) => k.wrap(cek, &mut out),
        ErasedKek::Aes256(k) => k.wrap(cek, &mut out),
    };
    res.map_err(|_| Error::InvalidLength)?;

    Ok(out)
}

/// Unwraps a key that was wrapped using [`wrap`].
///
/// # Errors
///
/// Returns [`Error::Unwrap`] if the integrity check fails or the wrapped key
/// has an impossible length, and [`Error::InvalidLength`] for a bad KEK.
pub fn unwrap(variant: AesKw, kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let kek = ErasedKek::new(variant, kek)?;

    if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
        return Err(Error::Unwrap);
    }

    let mut out = Zeroizing::new(alloc::vec![0u8; wrapped.len() - IV_LEN]);
    let res = match kek {
        ErasedKek::Aes128(k) => k.unwrap(wrapped, &mut out),
        ErasedKek::Aes192(k) => k.unwrap(wrapped, &mut out),
        ErasedKek::Aes256(k) => k.unwrap(wrapped, &mut out),
    };
    res.map_err(|_| Error::Unwrap)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEK: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const DATA: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    // RFC 3394 section 4.1
    const WRAPPED: [u8; 24] = [
        0x1f, 0xa6, 0x8b, 0x0a, 0x81, 0x12, 0xb4, 0x47, 0xae, 0xf3, 0x4b, 0xd8, 0xfb, 0x5a, 0x7b,
        0x82, 0x9d, 0x3e, 0x86, 0x23, 0x71, 0xd2, 0xcf, 0xe5,
    ];

    #[test]
    fn rfc3394_vector() {
        assert_eq!(wrap(AesKw::Aes128, &KEK, &DATA).unwrap(), WRAPPED);
        assert_eq!(&*unwrap(AesKw::Aes128, &KEK, &WRAPPED).unwrap(), &DATA);
    }

    #[test]
    fn integrity_check() {
        let mut wrapped = WRAPPED;
        wrapped[3] ^= 1;
        assert_eq!(unwrap(AesKw::Aes128, &KEK, &wrapped), Err(Error::Unwrap));
        assert_eq!(unwrap(AesKw::Aes128, &KEK, &wrapped[..16]), Err(Error::Unwrap));
    }

    #[test]
    fn key_length_must_match_variant() {
        assert_eq!(
            wrap(AesKw::Aes256, &KEK, &DATA),
            Err(Error::InvalidLength)
        );
        assert_eq!(wrap(AesKw::Aes128, &KEK, &DATA[..12]), Err(Error::InvalidLength));
    }

    #[test]
    fn every_kek_size_round_trips() {
        for (variant, len) in [(AesKw::Aes128, 16), (AesKw::Aes192, 24), (AesKw::Aes256, 32)] {
            let kek = [0x5au8; 32];
            let wrapped = wrap(variant, &kek[..len], &DATA).unwrap();
            assert_eq!(wrapped.len(), DATA.len() + 8);
            assert_eq!(&*unwrap(variant, &kek[..len], &wrapped).unwrap(), &DATA);
            assert_eq!(
                unwrap(variant, &kek[..len - 8], &wrapped),
                Err(Error::InvalidLength)
            );
        }
    }
}
