//! Reference relations implementing the strategy traits.
//!
//! Each relation provides a key generator, an honest prover strategy, a
//! verifier strategy and a cheating prover strategy that knows only the public
//! key. The cheaters can pass any single round with probability one half, which
//! is what the round-iteration layer amplifies away.

/// Binary-challenge Schnorr identification over a prime-order group.
pub mod discrete_log;
/// Graph isomorphism proof of knowledge.
pub mod graph_isomorphism;

use crate::PublicKeyGenerator;

/// Key material consisting only of an already known public key.
///
/// This is what an impersonator holds: enough to run the protocol, not enough to
/// answer both challenges.
#[derive(Clone, Debug)]
pub struct KnownPublicKey<P>(pub P);

impl<P: Clone> PublicKeyGenerator for KnownPublicKey<P> {
    type PublicKey = P;

    fn generate(&self) -> Option<P> {
        Some(self.0.clone())
    }
}
