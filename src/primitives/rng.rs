//! Cryptographically secure random number generator.

use rand_core::OsRng;
#[cfg(test)]
use rand_core::{CryptoRng, RngCore};

/// Default challenge and nonce source: the operating system's CSPRNG.
///
/// Every type that draws randomness is generic over `CryptoRngCore` and uses
/// this only as its default, so tests substitute a seeded or failing source.
pub type SecureRng = OsRng;

/// Entropy source that always fails, for exercising construction errors.
#[cfg(test)]
pub(crate) struct FailingRng;

#[cfg(test)]
impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn next_u64(&mut self) -> u64 {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unreachable!("FailingRng only supports try_fill_bytes")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::from(
            core::num::NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
        ))
    }
}

#[cfg(test)]
impl CryptoRng for FailingRng {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_rng_fills_bytes() {
        let mut rng = SecureRng::default();
        let mut buf = [0u8; 32];
        rng.try_fill_bytes(&mut buf).unwrap();
        assert_ne!(buf, [0u8; 32]);
    }

    #[test]
    fn failing_rng_reports_error() {
        let mut buf = [0u8; 1];
        assert!(FailingRng.try_fill_bytes(&mut buf).is_err());
    }
}
