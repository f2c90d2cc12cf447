//! In-process driver that relays events between a prover and a verifier actor.
//!
//! The driver owns both actors and every listener. Each protocol step pairs one
//! actor call with a receive on every channel that call may emit on, joined
//! under the configured step timeout, so a misbehaving actor surfaces as a
//! rejection or an [`Error::Timeout`] instead of a hung session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use crate::iterative::{ProverActor, ProverEvents, VerifierActor, VerifierEvents};
use crate::protocol::{ProverHelper, VerifierHelper};
use crate::{Error, PrivateKey, ProverError, Result, SecureRng, SessionConfig, VerifierError};

/// Why a session ended without success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The verifier actor reported a failure.
    #[error(transparent)]
    Verifier(#[from] VerifierError),
    /// The prover actor reported a failure.
    #[error(transparent)]
    Prover(#[from] ProverError),
}

/// Result of a completed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every round verified.
    Accepted {
        /// Rounds verified.
        rounds: u64,
    },
    /// The session stopped at `round` (1-based).
    Rejected {
        /// Round in which the failure occurred.
        round: u64,
        /// What went wrong.
        reason: Rejection,
    },
}

impl SessionOutcome {
    /// Whether the verifier was convinced.
    pub fn is_accepted(&self) -> bool {
        matches!(self, SessionOutcome::Accepted { .. })
    }
}

enum Verdict {
    Progress(u64),
    Accepted,
    Rejected(VerifierError),
}

/// A prover and verifier pair driven to completion in one task.
pub struct Session<P, V, R = SecureRng>
where
    P: ProverHelper,
    V: VerifierHelper,
{
    prover: ProverActor<P>,
    prover_events: ProverEvents<P::Proof, P::Response>,
    verifier: VerifierActor<V, R>,
    verifier_events: VerifierEvents,
    config: SessionConfig,
}

impl<P, V> Session<P, V>
where
    P: ProverHelper + Clone,
    V: VerifierHelper<Proof = P::Proof, Response = P::Response>,
{
    /// Creates a session whose verifier draws challenges from [`SecureRng`].
    ///
    /// `public_key` is the key the verifier checks against; for an honest
    /// prover it is the one derived from `key`.
    pub fn new(
        key: Arc<PrivateKey<P::Key>>,
        prover_helper: P,
        public_key: V::PublicKey,
        verifier_helper: V,
        config: SessionConfig,
    ) -> Result<Self> {
        Self::with_rng(
            key,
            prover_helper,
            public_key,
            verifier_helper,
            config,
            SecureRng::default(),
        )
    }
}

impl<P, V, R> Session<P, V, R>
where
    P: ProverHelper + Clone,
    V: VerifierHelper<Proof = P::Proof, Response = P::Response>,
    R: CryptoRngCore,
{
    /// Creates a session with an injected challenge source.
    pub fn with_rng(
        key: Arc<PrivateKey<P::Key>>,
        prover_helper: P,
        public_key: V::PublicKey,
        verifier_helper: V,
        config: SessionConfig,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;

        let (prover, prover_events) = ProverActor::new(key, prover_helper);
        let (verifier, verifier_events) =
            VerifierActor::with_rng(public_key, config.rounds, verifier_helper, rng)?;

        Ok(Self {
            prover,
            prover_events,
            verifier,
            verifier_events,
            config,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs rounds until the verifier succeeds or reports a failure.
    ///
    /// Protocol failures are returned as [`SessionOutcome::Rejected`]; a closed
    /// channel or an elapsed step timeout is returned as an error.
    pub async fn run(self) -> Result<SessionOutcome> {
        let Self {
            mut prover,
            mut prover_events,
            mut verifier,
            mut verifier_events,
            config,
        } = self;
        let timeout = config.step_timeout();

        info!(rounds = config.rounds, "starting session");

        let started = exchange(timeout, "next_round", verifier.start(), async {
            tokio::select! {
                Some(_) = verifier_events.next_round.recv() => Ok(None),
                Some(e) = verifier_events.error.recv() => Ok(Some(e)),
                else => Err(Error::ChannelClosed("next_round")),
            }
        })
        .await?;
        if let Some(error) = started {
            return Ok(rejected(1, error.into()));
        }

        loop {
            let round = verifier.completed() + 1;

            let proof = exchange(timeout, "proof", prover.next_round(), async {
                prover_events
                    .proof
                    .recv()
                    .await
                    .ok_or(Error::ChannelClosed("proof"))
            })
            .await?;

            let challenge = exchange(timeout, "challenge", verifier.proof(proof), async {
                tokio::select! {
                    Some(c) = verifier_events.challenge.recv() => Ok(Ok(c)),
                    Some(e) = verifier_events.error.recv() => Ok(Err(e)),
                    else => Err(Error::ChannelClosed("challenge")),
                }
            })
            .await?;
            let challenge = match challenge {
                Ok(challenge) => challenge,
                Err(error) => return Ok(rejected(round, error.into())),
            };

            let response = exchange(timeout, "response", prover.challenge(challenge), async {
                tokio::select! {
                    Some(r) = prover_events.response.recv() => Ok(Ok(r)),
                    Some(e) = prover_events.error.recv() => Ok(Err(e)),
                    else => Err(Error::ChannelClosed("response")),
                }
            })
            .await?;
            let response = match response {
                Ok(response) => response,
                Err(error) => return Ok(rejected(round, error.into())),
            };

            let verdict = exchange(timeout, "verdict", verifier.response(response), async {
                tokio::select! {
                    Some(_) = verifier_events.success.recv() => Ok(Verdict::Accepted),
                    Some(e) = verifier_events.error.recv() => Ok(Verdict::Rejected(e)),
                    Some(n) = verifier_events.progress.recv() => verifier_events
                        .next_round
                        .recv()
                        .await
                        .map(|_| Verdict::Progress(n))
                        .ok_or(Error::ChannelClosed("next_round")),
                    else => Err(Error::ChannelClosed("verdict")),
                }
            })
            .await?;

            match verdict {
                Verdict::Progress(completed) => {
                    debug!(completed, rounds = config.rounds, "round accepted");
                }
                Verdict::Accepted => {
                    info!(rounds = config.rounds, "session accepted");
                    return Ok(SessionOutcome::Accepted {
                        rounds: config.rounds,
                    });
                }
                Verdict::Rejected(error) => return Ok(rejected(round, error.into())),
            }
        }
    }
}

fn rejected(round: u64, reason: Rejection) -> SessionOutcome {
    warn!(round, %reason, "session rejected");
    SessionOutcome::Rejected { round, reason }
}

/// Runs an actor call and the matching receive together under `timeout`.
async fn exchange<T>(
    timeout: Duration,
    step: &'static str,
    send: impl Future<Output = Result<()>>,
    receive: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, async { tokio::join!(send, receive) }).await {
        Ok((sent, received)) => {
            sent?;
            received
        }
        Err(_) => Err(Error::Timeout(step)),
    }
}
