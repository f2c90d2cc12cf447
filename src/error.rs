//! Error types for the iterative ZKP engine.

/// Main error types for the library.
///
/// Protocol outcomes (a rejected response, an out-of-order message) are not
/// errors of this kind: they travel to the driver as [`ProverError`] and
/// [`VerifierError`] events. This type covers construction failures and the
/// driver-facing plumbing around the event channels.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A private key was constructed without a public key generator.
    #[error("Private key has no public key generator")]
    NilGenerator,

    /// Public key derivation or a challenge draw failed.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Invalid relation parameters were provided.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A verifier actor was configured with zero rounds.
    #[error("Round count must be at least 1")]
    InvalidRounds,

    /// The listener side of a notification channel was dropped.
    #[error("Notification channel '{0}' is closed")]
    ChannelClosed(&'static str),

    /// A driver-imposed wait elapsed before the expected event arrived.
    #[error("Timed out waiting for '{0}'")]
    Timeout(&'static str),

    /// Session configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Reported by a prover actor when a challenge arrives with no outstanding proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("out of order call")]
pub struct ProverError;

/// Reported by a verifier actor; exactly one cause per event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    /// The response did not satisfy the relation for the issued challenge.
    #[error("verification failed")]
    VerificationFailed,

    /// A response arrived with no proof outstanding for the current round.
    #[error("invalid message order")]
    InvalidMessageOrder,

    /// The per-round verifier could not be built (randomness unavailable).
    #[error("verifier construction error")]
    VerifierConstructionError,
}
