//! Per-message nonce generation.

use rand_core::{CryptoRng, OsRng, RngCore};

use crate::error::{Error, Result};

/// Byte length of an AES-GCM nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// Draw a fresh nonce from the operating system CSPRNG.
///
/// # Errors
///
/// Returns [`Error::NonceCreation`] if the OS random source fails.
pub fn create_nonce() -> Result<[u8; NONCE_LEN]> {
    create_nonce_with_rng(&mut OsRng)
}

/// Draw a fresh nonce from `rng`.
///
/// The buffer is only returned once completely filled.
///
/// # Errors
///
/// Returns [`Error::NonceCreation`] if `rng` fails.
pub fn create_nonce_with_rng<R>(rng: &mut R) -> Result<[u8; NONCE_LEN]>
where
    R: RngCore + CryptoRng,
{
    fill_nonce(rng).map_err(Error::NonceCreation)
}

/// Raw fill; callers decide which error kind a failure becomes.
pub(crate) fn fill_nonce<R>(rng: &mut R) -> std::result::Result<[u8; NONCE_LEN], rand_core::Error>
where
    R: RngCore + CryptoRng,
{
    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce)?;
    Ok(nonce)
}
