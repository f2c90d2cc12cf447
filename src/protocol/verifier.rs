use std::sync::Arc;

use rand_core::CryptoRngCore;
use tracing::trace;

use crate::{Challenge, Result};

/// Verifier strategy for one relation.
///
/// Both predicates must be pure. For a sound relation, a prover without the
/// secret can make at most one of `left`/`right` accept a given proof, so each
/// round catches a cheater with probability at least one half.
pub trait VerifierHelper {
    /// Public key the prover claims a secret for.
    type PublicKey;
    /// First message of a round.
    type Proof;
    /// Third message of a round.
    type Response;

    /// Checks a response to [`Challenge::Left`].
    fn left(
        &self,
        public_key: &Self::PublicKey,
        proof: &Self::Proof,
        response: &Self::Response,
    ) -> bool;

    /// Checks a response to [`Challenge::Right`].
    fn right(
        &self,
        public_key: &Self::PublicKey,
        proof: &Self::Proof,
        response: &Self::Response,
    ) -> bool;
}

/// Single-round, single-use Sigma-protocol verifier.
///
/// The challenge is drawn once at construction; build a new verifier for every
/// round.
pub struct Verifier<H: VerifierHelper> {
    public_key: Arc<H::PublicKey>,
    proof: H::Proof,
    challenge: Challenge,
    helper: Arc<H>,
}

impl<H: VerifierHelper> Verifier<H> {
    /// Creates a verifier for `proof` and draws its challenge from `rng`.
    ///
    /// Fails with [`Error::Construction`](crate::Error::Construction) if the
    /// randomness source cannot deliver a byte.
    pub fn new<R: CryptoRngCore + ?Sized>(
        public_key: Arc<H::PublicKey>,
        proof: H::Proof,
        helper: Arc<H>,
        rng: &mut R,
    ) -> Result<Self> {
        let challenge = Challenge::random(rng)?;
        trace!(%challenge, "drew challenge");

        Ok(Self {
            public_key,
            proof,
            challenge,
            helper,
        })
    }

    /// Returns the challenge to deliver to the prover (second message).
    pub fn challenge(&self) -> Challenge {
        self.challenge
    }

    /// Returns the proof this verifier was built for.
    pub fn proof(&self) -> &H::Proof {
        &self.proof
    }

    /// Interactive protocol: checks the response (fourth step).
    pub fn verify(&self, response: &H::Response) -> bool {
        match self.challenge {
            Challenge::Left => self.helper.left(&self.public_key, &self.proof, response),
            Challenge::Right => self.helper.right(&self.public_key, &self.proof, response),
        }
    }
}
