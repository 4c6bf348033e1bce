//! AES-GCM authenticated encryption envelopes.
//!
//! Three pieces, all free of I/O and logging:
//!
//! - [`create_key`] draws a random AES-128/192/256 key.
//! - [`create_nonce`] draws a random 96-bit nonce.
//! - [`encrypt`] / [`decrypt`] seal and open a complete message.
//!
//! # Envelope format
//!
//! ```text
//! [nonce: 12 bytes][ciphertext: len(plaintext) bytes][tag: 16 bytes]
//! ```
//!
//! There is no version byte, length prefix or associated data. Callers that
//! need a text-safe form apply their own encoding (e.g. base64) outside this
//! crate.
//!
//! Every operation is a stateless single call, so keys and envelopes may be
//! used from any number of threads at once.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod key;
pub mod nonce;

#[cfg(test)]
mod test_rng;

pub use envelope::{decrypt, encrypt, encrypt_with_rng, Envelope, ENVELOPE_OVERHEAD, TAG_LEN};
pub use error::{DecryptionFailure, EncryptionFailure, Error, KeySizeError, Result};
pub use key::{create_key, create_key_with_rng, KeySize, SecretKey};
pub use nonce::{create_nonce, create_nonce_with_rng, NONCE_LEN};
