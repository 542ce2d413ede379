//! Payload compression, selected by the `zip` header parameter as defined in
//! [section 4.1.3 of RFC 7516].
//!
//! [section 4.1.3 of RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516#section-4.1.3>

use alloc::vec::Vec;
use core::fmt;

use crate::jwa::CompressionAlgorithm;

/// Failure of a compression method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input could not be compressed.
    #[error("failed to compress the payload")]
    Compress,
    /// The input is not valid compressed data.
    #[error("failed to decompress the payload")]
    Decompress,
}

/// A byte-to-byte transform pair identified by a `zip` token.
///
/// Implement this trait and add it to a
/// [`Registry`](crate::jwe::algorithm::Registry) to support a compression
/// method other than `DEF`.
pub trait Compression: fmt::Debug + Send + Sync {
    /// The `zip` value this method is registered under.
    fn algorithm(&self) -> CompressionAlgorithm;

    /// Compresses `data`.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;

    /// Decompresses `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompress`] for malformed input.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;
}

/// The raw DEFLATE format from [RFC 1951], without zlib or gzip framing.
///
/// [RFC 1951]: <https://datatracker.ietf.org/doc/html/rfc1951>
#[cfg(feature = "deflate")]
#[derive(Debug, Clone, Copy)]
pub struct Deflate {
    level: flate2::Compression,
}

#[cfg(feature = "deflate")]
impl Deflate {
    /// Creates a DEFLATE method using the given compression level, from 0 (no
    /// compression) to 9 (best).
    pub fn new(level: u32) -> Self {
        Self {
            level: flate2::Compression::new(level.min(9)),
        }
    }
}

#[cfg(feature = "deflate")]
impl Default for Deflate {
    fn default() -> Self {
        Self {
            level: flate2::Compression::default(),
        }
    }
}

#[cfg(feature = "deflate")]
impl Compression for Deflate {
    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Deflate
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        use std::io::Write as _;

        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), self.level);
        encoder.write_all(data).map_err(|_| Error::Compress)?;
        encoder.finish().map_err(|_| Error::Compress)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        use std::io::Read as _;

        let mut decoder = flate2::read::DeflateDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|_| Error::Decompress)?;
        Ok(out)
    }
}

#[cfg(all(test, feature = "deflate"))]
mod tests {
    use super::*;

    #[test]
    fn deflate_roundtrip() {
        let data = b"You can trust us to stick with you through thick and thin. ".repeat(8);
        let deflate = Deflate::default();

        let compressed = deflate.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(deflate.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn deflate_rejects_garbage() {
        // BTYPE 11 is reserved
        assert_eq!(Deflate::new(6).decompress(&[0xff, 0xff]), Err(Error::Decompress));
    }
}
