use std::sync::Arc;

use tracing::trace;

use crate::{Challenge, PrivateKey, PublicKeyGenerator};

/// Prover strategy for one relation.
///
/// Supplies the relation-specific half of a round: the proof (commitment) and
/// the two possible openings. Each per-round [`Prover`] owns its own copy of the
/// strategy, so state kept between `generate` and `left`/`right` (commitment
/// randomness, typically) belongs to exactly one round.
pub trait ProverHelper {
    /// Private key material this strategy proves knowledge of.
    type Key: PublicKeyGenerator;
    /// First message of a round.
    type Proof: Clone;
    /// Third message of a round.
    type Response: Clone;

    /// Produces the proof for a new round.
    fn generate(&mut self, key: &PrivateKey<Self::Key>) -> Self::Proof;

    /// Opens the proof for a [`Challenge::Left`].
    fn left(&mut self, key: &PrivateKey<Self::Key>) -> Self::Response;

    /// Opens the proof for a [`Challenge::Right`].
    fn right(&mut self, key: &PrivateKey<Self::Key>) -> Self::Response;
}

/// Single-round Sigma-protocol prover.
///
/// Holds at most one outstanding proof and the response given to it.
pub struct Prover<H: ProverHelper> {
    key: Arc<PrivateKey<H::Key>>,
    helper: H,
    proof: Option<H::Proof>,
    response: Option<H::Response>,
}

impl<H: ProverHelper> Prover<H> {
    /// Creates a prover for the given key and strategy.
    pub fn new(key: Arc<PrivateKey<H::Key>>, helper: H) -> Self {
        Self {
            key,
            helper,
            proof: None,
            response: None,
        }
    }

    /// Interactive protocol: generates the proof (first message).
    ///
    /// Calling this again replaces the stored proof and forgets any response.
    pub fn construct_proof(&mut self) -> H::Proof {
        let proof = self.helper.generate(&self.key);
        self.proof = Some(proof.clone());
        self.response = None;
        trace!("constructed proof");
        proof
    }

    /// Interactive protocol: answers the challenge (third message).
    pub fn respond(&mut self, challenge: Challenge) -> H::Response {
        let response = match challenge {
            Challenge::Left => self.helper.left(&self.key),
            Challenge::Right => self.helper.right(&self.key),
        };
        self.response = Some(response.clone());
        trace!(%challenge, "responded to challenge");
        response
    }

    /// Returns the outstanding proof, if one has been constructed.
    pub fn proof(&self) -> Option<&H::Proof> {
        self.proof.as_ref()
    }

    /// Returns the last response given, if any.
    pub fn response(&self) -> Option<&H::Response> {
        self.response.as_ref()
    }
}
