//! AES-GCM seal and open of complete messages.
//!
//! **Algorithm choice:** AES-GCM (NIST SP 800-38D) with a 96-bit random nonce
//! and a 128-bit tag. The AES variant follows the key length: 16, 24 or 32
//! bytes select AES-128, AES-192 or AES-256.
//!
//! **Never reuse a nonce with the same key.** GCM nonce reuse breaks both
//! confidentiality and authentication, so every call to [`encrypt`] draws a
//! fresh nonce from the CSPRNG.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand_core::{CryptoRng, OsRng, RngCore};

use crate::error::{DecryptionFailure, EncryptionFailure, Error, KeySizeError, Result};
use crate::key::KeySize;
use crate::nonce::{fill_nonce, NONCE_LEN};

/// Byte length of the GCM authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

/// Bytes an envelope adds on top of the plaintext.
pub const ENVELOPE_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Associated data is part of the GCM construction but unused by this format.
const ASSOCIATED_DATA: &[u8] = &[];

type Aes192Gcm = AesGcm<Aes192, U12>;

/// A borrowed, length-checked view of an envelope.
///
/// ```text
/// [nonce: 12 bytes][ciphertext: len(plaintext) bytes][tag: 16 bytes]
/// ```
///
/// Ciphertext and tag form one sealed unit; the tag is simply the trailing
/// [`TAG_LEN`] bytes of [`Envelope::sealed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    nonce: &'a [u8; NONCE_LEN],
    sealed: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Split `bytes` into nonce and sealed portion.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptionFailure::MalformedEnvelope`] if `bytes` is not
    /// strictly longer than [`NONCE_LEN`].
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let malformed = || {
            Error::Decryption(DecryptionFailure::MalformedEnvelope { len: bytes.len() })
        };
        if bytes.len() <= NONCE_LEN {
            return Err(malformed());
        }
        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let nonce = nonce.try_into().map_err(|_| malformed())?;
        Ok(Self { nonce, sealed })
    }

    /// The nonce the message was sealed under.
    pub fn nonce(&self) -> &'a [u8; NONCE_LEN] {
        self.nonce
    }

    /// Ciphertext followed by the authentication tag.
    pub fn sealed(&self) -> &'a [u8] {
        self.sealed
    }

    /// Plaintext length implied by the envelope, or `None` if the sealed
    /// portion is too short to hold a tag (such an envelope cannot open).
    pub fn plaintext_len(&self) -> Option<usize> {
        self.sealed.len().checked_sub(TAG_LEN)
    }
}

/// AES-GCM instance keyed for one of the supported sizes.
enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl Cipher {
    /// Deterministic setup: validates the key length and expands the key.
    fn new(key: &[u8]) -> std::result::Result<Self, KeySizeError> {
        let invalid = |_| KeySizeError::Length(key.len());
        Ok(match KeySize::from_len(key.len())? {
            KeySize::Aes128 => Self::Aes128(Aes128Gcm::new_from_slice(key).map_err(invalid)?),
            KeySize::Aes192 => Self::Aes192(Aes192Gcm::new_from_slice(key).map_err(invalid)?),
            KeySize::Aes256 => Self::Aes256(Aes256Gcm::new_from_slice(key).map_err(invalid)?),
        })
    }

    fn seal(
        &self,
        nonce: &[u8; NONCE_LEN],
        msg: &[u8],
    ) -> std::result::Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        let payload = Payload {
            msg,
            aad: ASSOCIATED_DATA,
        };
        match self {
            Self::Aes128(c) => c.encrypt(nonce, payload),
            Self::Aes192(c) => c.encrypt(nonce, payload),
            Self::Aes256(c) => c.encrypt(nonce, payload),
        }
    }

    fn open(
        &self,
        nonce: &[u8; NONCE_LEN],
        msg: &[u8],
    ) -> std::result::Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        let payload = Payload {
            msg,
            aad: ASSOCIATED_DATA,
        };
        match self {
            Self::Aes128(c) => c.decrypt(nonce, payload),
            Self::Aes192(c) => c.decrypt(nonce, payload),
            Self::Aes256(c) => c.decrypt(nonce, payload),
        }
    }
}

/// Seal `plaintext` under `key` and return the envelope `nonce || ciphertext || tag`.
///
/// A random 96-bit nonce is drawn from the OS CSPRNG for every call, so
/// encrypting the same plaintext twice yields different envelopes.
///
/// # Errors
///
/// Returns [`Error::Encryption`] if the key is not 16, 24 or 32 bytes, if no
/// nonce could be generated, or if sealing fails.
///
/// # Example
///
/// ```
/// use aesgcm::{create_key, decrypt, encrypt, KeySize};
///
/// let key = create_key(KeySize::Aes256).unwrap();
/// let envelope = encrypt(key.as_bytes(), b"attack at dawn").unwrap();
/// let plaintext = decrypt(key.as_bytes(), &envelope).unwrap();
///
/// assert_eq!(plaintext, b"attack at dawn");
/// ```
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(&mut OsRng, key, plaintext)
}

/// [`encrypt`] with the nonce drawn from `rng`.
///
/// # Errors
///
/// See [`encrypt`].
pub fn encrypt_with_rng<R>(rng: &mut R, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    R: RngCore + CryptoRng,
{
    let cipher =
        Cipher::new(key).map_err(|e| Error::Encryption(EncryptionFailure::InvalidKey(e)))?;

    let nonce = fill_nonce(rng).map_err(|e| Error::Encryption(EncryptionFailure::Nonce(e)))?;

    let sealed = cipher
        .seal(&nonce, plaintext)
        .map_err(|_| Error::Encryption(EncryptionFailure::Seal))?;
    if sealed.is_empty() {
        return Err(Error::Encryption(EncryptionFailure::EmptySeal));
    }

    let mut envelope = Vec::with_capacity(NONCE_LEN + sealed.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&sealed);
    Ok(envelope)
}

/// Open an envelope produced by [`encrypt`] with the same key.
///
/// Plaintext is only returned after the tag has verified; no partial output
/// is ever produced.
///
/// # Errors
///
/// Returns [`Error::Decryption`] if the key is not 16, 24 or 32 bytes, if the
/// envelope is no longer than a nonce, or if authentication fails (tampered
/// bytes, truncation, or the wrong key).
pub fn decrypt(key: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Cipher::new(key).map_err(|e| Error::Decryption(DecryptionFailure::InvalidKey(e)))?;
    let envelope = Envelope::parse(envelope)?;

    cipher
        .open(envelope.nonce(), envelope.sealed())
        .map_err(|_| Error::Decryption(DecryptionFailure::Authentication))
}
