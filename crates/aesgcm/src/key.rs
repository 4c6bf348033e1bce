//! Key sizes and secret key generation.

use std::fmt;
use std::str::FromStr;

use rand_core::{CryptoRng, OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{Error, KeySizeError, Result};

/// Supported AES key sizes. The discriminant is the key length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// AES-128, 16 bytes.
    Aes128 = 16,
    /// AES-192, 24 bytes.
    Aes192 = 24,
    /// AES-256, 32 bytes.
    Aes256 = 32,
}

impl KeySize {
    /// Every supported size, smallest first.
    pub const ALL: [KeySize; 3] = [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256];

    /// Key length in bytes.
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Key length in bits.
    pub const fn bits(self) -> u32 {
        (self as u32) * 8
    }

    /// Map a key length in bytes to a supported size.
    ///
    /// # Errors
    ///
    /// Returns [`KeySizeError::Length`] for any length other than 16, 24 or 32.
    pub fn from_len(len: usize) -> std::result::Result<Self, KeySizeError> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            other => Err(KeySizeError::Length(other)),
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = KeySizeError;

    /// Converts a bit count (128, 192 or 256).
    fn try_from(bits: u32) -> std::result::Result<Self, Self::Error> {
        match bits {
            128 => Ok(KeySize::Aes128),
            192 => Ok(KeySize::Aes192),
            256 => Ok(KeySize::Aes256),
            other => Err(KeySizeError::Bits(other)),
        }
    }
}

impl FromStr for KeySize {
    type Err = KeySizeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bits: u32 = s
            .trim()
            .parse()
            .map_err(|_| KeySizeError::Unparsable(s.to_owned()))?;
        KeySize::try_from(bits)
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.bits())
    }
}

/// Owned AES key material.
///
/// The buffer is overwritten with zeroes when the key is dropped. Callers that
/// persist or transmit keys do so through [`SecretKey::as_bytes`] and own the
/// lifetime of any copies they make.
pub struct SecretKey {
    size: KeySize,
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretKey {
    /// Copy existing key material into a [`SecretKey`].
    ///
    /// # Errors
    ///
    /// Returns [`KeySizeError::Length`] if `bytes` is not a supported length.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, KeySizeError> {
        let size = KeySize::from_len(bytes.len())?;
        Ok(Self {
            size,
            bytes: Zeroizing::new(bytes.to_vec()),
        })
    }

    /// The size of this key.
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Raw key bytes. Avoid logging or persisting the returned slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "SecretKey({}, [REDACTED])", self.size)
    }
}

/// Create a random key of `size` from the operating system CSPRNG.
///
/// # Errors
///
/// Returns [`Error::KeyCreation`] if the OS random source fails.
pub fn create_key(size: KeySize) -> Result<SecretKey> {
    create_key_with_rng(&mut OsRng, size)
}

/// Create a random key of `size` from `rng`.
///
/// Uses the fallible fill so an exhausted or broken source is reported rather
/// than leaving a partially filled key.
///
/// # Errors
///
/// Returns [`Error::KeyCreation`] if `rng` fails.
pub fn create_key_with_rng<R>(rng: &mut R, size: KeySize) -> Result<SecretKey>
where
    R: RngCore + CryptoRng,
{
    let mut bytes = Zeroizing::new(vec![0u8; size.bytes()]);
    rng.try_fill_bytes(&mut bytes).map_err(Error::KeyCreation)?;
    Ok(SecretKey { size, bytes })
}
