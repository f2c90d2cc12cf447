//! Round-iteration actors.
//!
//! A [`ProverActor`] and a [`VerifierActor`] each wrap the single-round
//! primitives from [`crate::protocol`] and run them once per round, reporting
//! every step as an event on a rendezvous channel (see [`notify`]). The actors
//! never talk to each other: a driver relays events between them, in-process
//! (see [`crate::session`]) or over a transport of its own.

/// Rendezvous notification channels.
pub mod notify;
/// Prover-side actor.
pub mod prover;
/// Verifier-side actor.
pub mod verifier;

pub use notify::{Emitter, Listener, handoff};
pub use prover::{ProverActor, ProverEvents};
pub use verifier::{VerifierActor, VerifierEvents};
