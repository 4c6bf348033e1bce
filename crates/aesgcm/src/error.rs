//! Error taxonomy for key generation, nonce generation, and the envelope codec.

use thiserror::Error;

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every public operation.
///
/// Each variant names the operation that failed and carries the underlying
/// cause as its [`source`](std::error::Error::source), so callers can match on
/// the kind and still log the full chain.
#[derive(Debug, Error)]
pub enum Error {
    /// The secure random source could not supply key material.
    #[error("key creation failed")]
    KeyCreation(#[source] rand_core::Error),

    /// The secure random source could not supply a nonce.
    #[error("creating nonce failed")]
    NonceCreation(#[source] rand_core::Error),

    /// Cipher setup or sealing failed.
    #[error("encryption failed")]
    Encryption(#[source] EncryptionFailure),

    /// Cipher setup, envelope parsing, or authentication failed.
    #[error("decryption failed")]
    Decryption(#[source] DecryptionFailure),
}

/// Why an encryption was aborted.
#[derive(Debug, Error)]
pub enum EncryptionFailure {
    /// The key is not one of the supported AES key lengths.
    #[error("cipher setup failed")]
    InvalidKey(#[source] KeySizeError),

    /// No nonce could be drawn; the message was not sealed.
    #[error("creating nonce failed")]
    Nonce(#[source] rand_core::Error),

    /// The AEAD primitive reported an error while sealing.
    #[error("aead seal failed")]
    Seal,

    /// The AEAD primitive returned no output without reporting an error.
    #[error("aead seal produced no output")]
    EmptySeal,
}

/// Why a decryption was rejected.
///
/// [`DecryptionFailure::Authentication`] deliberately covers every way the
/// sealed bytes can be wrong (bad tag, flipped ciphertext bit, wrong nonce,
/// wrong key) without distinguishing between them.
#[derive(Debug, Error)]
pub enum DecryptionFailure {
    /// The key is not one of the supported AES key lengths.
    #[error("cipher setup failed")]
    InvalidKey(#[source] KeySizeError),

    /// The envelope is too short to hold a nonce and any sealed bytes.
    #[error("malformed envelope: {len} bytes is not longer than the nonce")]
    MalformedEnvelope {
        /// Length of the rejected envelope.
        len: usize,
    },

    /// Tag verification failed.
    #[error("message authentication failed")]
    Authentication,
}

/// A key size outside the supported AES set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySizeError {
    /// A bit count other than 128, 192 or 256.
    #[error("unsupported key size: {0} bits (expected 128, 192 or 256)")]
    Bits(u32),

    /// A byte length other than 16, 24 or 32.
    #[error("invalid key length: {0} bytes (expected 16, 24 or 32)")]
    Length(usize),

    /// Text that is not a bit count at all.
    #[error("unrecognised key size {0:?}")]
    Unparsable(String),
}

impl Error {
    /// Returns `true` if this error was caused by a malformed (too short) envelope.
    pub fn is_malformed_envelope(&self) -> bool {
        matches!(
            self,
            Error::Decryption(DecryptionFailure::MalformedEnvelope { .. })
        )
    }

    /// Returns `true` if this error was an authentication (tag) failure.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Error::Decryption(DecryptionFailure::Authentication))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_operation() {
        assert_eq!(
            Error::Encryption(EncryptionFailure::Seal).to_string(),
            "encryption failed"
        );
        assert_eq!(
            Error::Decryption(DecryptionFailure::Authentication).to_string(),
            "decryption failed"
        );
    }

    #[test]
    fn source_carries_the_cause() {
        let e = Error::Decryption(DecryptionFailure::MalformedEnvelope { len: 7 });
        let source = e.source().unwrap().to_string();
        assert!(source.contains("7 bytes"));
    }

    #[test]
    fn invalid_key_chain_reaches_key_size_error() {
        let e = Error::Encryption(EncryptionFailure::InvalidKey(KeySizeError::Length(5)));
        let cause = e.source().unwrap().source().unwrap().to_string();
        assert!(cause.contains("5 bytes"));
    }

    #[test]
    fn classification_helpers() {
        assert!(Error::Decryption(DecryptionFailure::MalformedEnvelope { len: 0 })
            .is_malformed_envelope());
        assert!(Error::Decryption(DecryptionFailure::Authentication).is_authentication_failure());
        assert!(!Error::Encryption(EncryptionFailure::EmptySeal).is_authentication_failure());
    }
}
