//! The binary challenge issued by the verifier each round.

use std::fmt;

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Verifier's per-round choice of which response branch the prover must open.
///
/// The type is closed to exactly two values, so every dispatch on it is an
/// exhaustive match and an "unknown challenge" cannot reach the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Challenge {
    /// First branch.
    Left,
    /// Second branch.
    Right,
}

impl Challenge {
    /// Draws a uniformly random challenge from a cryptographically secure source.
    ///
    /// One byte is requested and its low bit decides the branch. A source that
    /// cannot deliver entropy is reported as [`Error::Construction`].
    pub fn random<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut byte = [0u8; 1];
        rng.try_fill_bytes(&mut byte)
            .map_err(|e| Error::Construction(format!("Unable to get random bit: {e}")))?;

        Ok(Self::from_bit(byte[0]))
    }

    /// Maps the low bit of `value` to a challenge: even is `Left`, odd is `Right`.
    pub fn from_bit(value: u8) -> Self {
        match value & 1 {
            0 => Challenge::Left,
            _ => Challenge::Right,
        }
    }

    /// The other branch.
    pub fn flip(self) -> Self {
        match self {
            Challenge::Left => Challenge::Right,
            Challenge::Right => Challenge::Left,
        }
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Challenge::Left => f.write_str("left"),
            Challenge::Right => f.write_str("right"),
        }
    }
}
