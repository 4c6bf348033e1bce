//! Deterministic and failing random sources for unit tests.

use rand_core::{CryptoRng, Error, RngCore};

/// Always fails, as an exhausted or unavailable entropy source would.
pub struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), Error> {
        Err(Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}

/// Yields zeroes, for known-answer tests against published GCM vectors.
pub struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        dest.fill(0);
        Ok(())
    }
}

impl CryptoRng for ZeroRng {}
