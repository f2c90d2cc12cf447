/// Single-round prover and its strategy trait.
pub mod prover;
/// Single-round verifier and its strategy trait.
pub mod verifier;

pub use prover::{Prover, ProverHelper};
pub use verifier::{Verifier, VerifierHelper};
