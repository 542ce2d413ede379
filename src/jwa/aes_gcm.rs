/// Variants of AES in Galois/Counter Mode, used both for content encryption
/// ([section 5.3 of RFC 7518]) and for key wrapping ([section 4.7 of RFC
/// 7518])
///
/// [section 5.3 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-5.3>
/// [section 4.7 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-4.7>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesGcm {
    /// AES GCM using 128-bit key
    Aes128,
    /// AES GCM using 192-bit key
    Aes192,
    /// AES GCM using 256-bit key
    Aes256,
}

impl AesGcm {
    /// The length of the key in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}
