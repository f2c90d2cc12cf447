use std::sync::Arc;

use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::notify::{Emitter, Listener, handoff};
use crate::protocol::{Verifier, VerifierHelper};
use crate::{Challenge, Error, Result, SecureRng, VerifierError};

/// Listeners for everything a [`VerifierActor`] emits.
#[derive(Debug)]
pub struct VerifierEvents {
    /// Challenge drawn for the current round's proof.
    pub challenge: Listener<Challenge>,
    /// Request for the prover to start another round.
    pub next_round: Listener<bool>,
    /// Protocol failure for the current round.
    pub error: Listener<VerifierError>,
    /// All rounds verified.
    pub success: Listener<bool>,
    /// Number of rounds verified so far, short of the target.
    pub progress: Listener<u64>,
}

struct VerifierNotifier {
    challenge: Emitter<Challenge>,
    next_round: Emitter<bool>,
    error: Emitter<VerifierError>,
    success: Emitter<bool>,
    progress: Emitter<u64>,
}

enum VerifierState<H: VerifierHelper> {
    Idle,
    AwaitingResponse { verifier: Verifier<H> },
    Done,
}

/// Drives the verifier side of a multi-round session.
///
/// Each accepted proof gets a fresh single-round [`Verifier`] and therefore a
/// fresh random challenge. After `rounds` verified responses the actor emits
/// success and becomes `Done`; any rejected response ends the session with
/// [`VerifierError::VerificationFailed`].
pub struct VerifierActor<H: VerifierHelper, R = SecureRng> {
    public_key: Arc<H::PublicKey>,
    helper: Arc<H>,
    rng: R,
    rounds: u64,
    counter: u64,
    state: VerifierState<H>,
    notifier: VerifierNotifier,
}

impl<H: VerifierHelper> VerifierActor<H> {
    /// Creates a verifier actor drawing challenges from [`SecureRng`].
    pub fn new(public_key: H::PublicKey, rounds: u64, helper: H) -> Result<(Self, VerifierEvents)> {
        Self::with_rng(public_key, rounds, helper, SecureRng::default())
    }
}

impl<H: VerifierHelper, R: CryptoRngCore> VerifierActor<H, R> {
    /// Creates a verifier actor with an injected randomness source.
    ///
    /// Fails with [`Error::InvalidRounds`] if `rounds` is zero.
    pub fn with_rng(
        public_key: H::PublicKey,
        rounds: u64,
        helper: H,
        rng: R,
    ) -> Result<(Self, VerifierEvents)> {
        if rounds == 0 {
            return Err(Error::InvalidRounds);
        }

        let (challenge_tx, challenge_rx) = handoff("challenge");
        let (next_round_tx, next_round_rx) = handoff("next_round");
        let (error_tx, error_rx) = handoff("verifier_error");
        let (success_tx, success_rx) = handoff("success");
        let (progress_tx, progress_rx) = handoff("progress");

        let actor = Self {
            public_key: Arc::new(public_key),
            helper: Arc::new(helper),
            rng,
            rounds,
            counter: 0,
            state: VerifierState::Idle,
            notifier: VerifierNotifier {
                challenge: challenge_tx,
                next_round: next_round_tx,
                error: error_tx,
                success: success_tx,
                progress: progress_tx,
            },
        };
        let events = VerifierEvents {
            challenge: challenge_rx,
            next_round: next_round_rx,
            error: error_rx,
            success: success_rx,
            progress: progress_rx,
        };

        Ok((actor, events))
    }

    /// Requests a round from the prover side.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_done() {
            warn!("start called on a finished session");
            return self.report(VerifierError::InvalidMessageOrder).await;
        }

        debug!(completed = self.counter, "requesting next round");
        self.notifier.next_round.emit(true).await
    }

    /// Accepts the current round's proof and emits a freshly drawn challenge.
    pub async fn proof(&mut self, proof: H::Proof) -> Result<()> {
        if self.is_done() {
            warn!("proof received on a finished session");
            return self.report(VerifierError::InvalidMessageOrder).await;
        }

        if let VerifierState::AwaitingResponse { .. } = self.state {
            warn!(completed = self.counter, "replacing unanswered challenge");
        }

        let verifier = match Verifier::new(
            Arc::clone(&self.public_key),
            proof,
            Arc::clone(&self.helper),
            &mut self.rng,
        ) {
            Ok(verifier) => verifier,
            Err(e) => {
                warn!("failed to construct round verifier: {e}");
                self.state = VerifierState::Idle;
                return self.report(VerifierError::VerifierConstructionError).await;
            }
        };

        let challenge = verifier.challenge();
        self.state = VerifierState::AwaitingResponse { verifier };

        debug!(round = self.counter + 1, %challenge, "emitting challenge");
        self.notifier.challenge.emit(challenge).await
    }

    /// Checks the prover's response to the current round's challenge.
    pub async fn response(&mut self, response: H::Response) -> Result<()> {
        let verifier = match std::mem::replace(&mut self.state, VerifierState::Idle) {
            VerifierState::AwaitingResponse { verifier } => verifier,
            VerifierState::Idle => {
                warn!("response received with no outstanding challenge");
                return self.report(VerifierError::InvalidMessageOrder).await;
            }
            VerifierState::Done => {
                self.state = VerifierState::Done;
                warn!("response received on a finished session");
                return self.report(VerifierError::InvalidMessageOrder).await;
            }
        };

        if !verifier.verify(&response) {
            warn!(round = self.counter + 1, "response failed verification");
            return self.report(VerifierError::VerificationFailed).await;
        }

        self.counter += 1;
        if self.counter == self.rounds {
            self.state = VerifierState::Done;
            info!(rounds = self.rounds, "all rounds verified");
            return self.notifier.success.emit(true).await;
        }

        debug!(completed = self.counter, rounds = self.rounds, "round verified");
        self.notifier.progress.emit(self.counter).await?;
        self.notifier.next_round.emit(true).await
    }

    /// Target number of rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Rounds verified so far.
    pub fn completed(&self) -> u64 {
        self.counter
    }

    /// Whether a challenge has been issued and not yet answered.
    pub fn is_awaiting_response(&self) -> bool {
        matches!(self.state, VerifierState::AwaitingResponse { .. })
    }

    /// Whether every round has been verified.
    pub fn is_done(&self) -> bool {
        matches!(self.state, VerifierState::Done)
    }

    async fn report(&self, error: VerifierError) -> Result<()> {
        self.notifier.error.emit(error).await
    }
}
