//! Interactive zero-knowledge proofs by repeated Sigma-protocol rounds.
//!
//! A prover convinces a verifier that it knows the secret behind a public key
//! by answering a random binary challenge, round after round. A prover without
//! the secret can answer at most one of the two challenges for any proof it
//! commits to, so it survives `n` rounds with probability at most `2^-n`.
//!
//! The crate is layered:
//!
//! - [`primitives`]: key pairs, the [`Challenge`] type and secure randomness
//! - [`protocol`]: one round, as a single-use [`Prover`] / [`Verifier`] pair
//!   parameterised by [`ProverHelper`] / [`VerifierHelper`] strategies
//! - [`iterative`]: [`ProverActor`] / [`VerifierActor`], which run rounds
//!   repeatedly and report each step over rendezvous channels
//! - [`session`]: an in-process driver relaying events between two actors
//! - [`relations`]: discrete-log and graph-isomorphism strategies
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use iterative_zkp::relations::discrete_log::{DlogGroup, DlogProver, DlogSecret, DlogVerifier};
//! use iterative_zkp::{PrivateKey, SecureRng, Session, SessionConfig};
//!
//! # async fn example() -> iterative_zkp::Result<()> {
//! let group = Arc::new(DlogGroup::rfc5114());
//! let secret = DlogSecret::random(Arc::clone(&group), &mut SecureRng::default());
//! let key = Arc::new(PrivateKey::with_generator(secret));
//! let public_key = key.public_key()?.clone();
//!
//! let session = Session::new(
//!     key,
//!     DlogProver::new(),
//!     public_key,
//!     DlogVerifier::new(group),
//!     SessionConfig::with_rounds(40),
//! )?;
//! assert!(session.run().await?.is_accepted());
//! # Ok(())
//! # }
//! ```

/// Session configuration.
pub mod config;
/// Error types.
pub mod error;
/// Round-iteration actors and their notification channels.
pub mod iterative;
/// Keys, challenges and randomness.
pub mod primitives;
/// Single-round Sigma-protocol prover and verifier.
pub mod protocol;
/// Reference relations.
pub mod relations;
/// In-process session driver.
pub mod session;

pub use config::SessionConfig;
pub use error::{Error, ProverError, VerifierError};
pub use iterative::{ProverActor, ProverEvents, VerifierActor, VerifierEvents};
pub use primitives::{Challenge, PrivateKey, PublicKeyGenerator, SecureRng};
pub use protocol::{Prover, ProverHelper, Verifier, VerifierHelper};
pub use session::{Rejection, Session, SessionOutcome};

/// Result type for library operations.
pub type Result<T> = core::result::Result<T, Error>;
