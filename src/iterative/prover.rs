use std::sync::Arc;

use tracing::{debug, warn};

use super::notify::{Emitter, Listener, handoff};
use crate::protocol::{Prover, ProverHelper};
use crate::{Challenge, PrivateKey, ProverError, Result};

/// Listeners for everything a [`ProverActor`] emits.
#[derive(Debug)]
pub struct ProverEvents<P, R> {
    /// Proof constructed for a new round.
    pub proof: Listener<P>,
    /// Out-of-order challenge.
    pub error: Listener<ProverError>,
    /// Response to the current round's challenge.
    pub response: Listener<R>,
}

struct ProverNotifier<P, R> {
    proof: Emitter<P>,
    error: Emitter<ProverError>,
    response: Emitter<R>,
}

enum ProverState<H: ProverHelper> {
    Idle,
    AwaitingChallenge { prover: Prover<H> },
}

/// Drives the prover side of a multi-round session.
///
/// The actor is `Idle` until [`next_round`](Self::next_round) emits a proof,
/// then `AwaitingChallenge` until [`challenge`](Self::challenge) emits the
/// response. Entry points take `&mut self` and must be called serially.
pub struct ProverActor<H: ProverHelper> {
    key: Arc<PrivateKey<H::Key>>,
    helper: H,
    state: ProverState<H>,
    round: u64,
    notifier: ProverNotifier<H::Proof, H::Response>,
}

impl<H: ProverHelper + Clone> ProverActor<H> {
    /// Creates a prover actor and the listeners for its events.
    pub fn new(
        key: Arc<PrivateKey<H::Key>>,
        helper: H,
    ) -> (Self, ProverEvents<H::Proof, H::Response>) {
        let (proof_tx, proof_rx) = handoff("proof");
        let (error_tx, error_rx) = handoff("prover_error");
        let (response_tx, response_rx) = handoff("response");

        let actor = Self {
            key,
            helper,
            state: ProverState::Idle,
            round: 0,
            notifier: ProverNotifier {
                proof: proof_tx,
                error: error_tx,
                response: response_tx,
            },
        };
        let events = ProverEvents {
            proof: proof_rx,
            error: error_rx,
            response: response_rx,
        };

        (actor, events)
    }

    /// Starts a round: builds a fresh single-round prover and emits its proof.
    ///
    /// An unanswered round still outstanding is discarded.
    pub async fn next_round(&mut self) -> Result<()> {
        let mut prover = Prover::new(Arc::clone(&self.key), self.helper.clone());
        let proof = prover.construct_proof();

        if let ProverState::AwaitingChallenge { .. } = self.state {
            warn!(round = self.round, "discarding unanswered round");
        }
        self.state = ProverState::AwaitingChallenge { prover };
        self.round += 1;

        debug!(round = self.round, "emitting proof");
        self.notifier.proof.emit(proof).await
    }

    /// Answers the current round's challenge.
    ///
    /// With no proof outstanding a [`ProverError`] is emitted instead and the
    /// actor stays `Idle`.
    pub async fn challenge(&mut self, challenge: Challenge) -> Result<()> {
        match std::mem::replace(&mut self.state, ProverState::Idle) {
            ProverState::Idle => {
                warn!(%challenge, "challenge received with no outstanding proof");
                self.notifier.error.emit(ProverError).await
            }
            ProverState::AwaitingChallenge { mut prover } => {
                let response = prover.respond(challenge);
                debug!(round = self.round, %challenge, "emitting response");
                self.notifier.response.emit(response).await
            }
        }
    }

    /// Whether a proof has been emitted and not yet answered.
    pub fn is_awaiting_challenge(&self) -> bool {
        matches!(self.state, ProverState::AwaitingChallenge { .. })
    }

    /// Number of rounds started so far.
    pub fn rounds_started(&self) -> u64 {
        self.round
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::PublicKeyGenerator;

    const WAIT: Duration = Duration::from_secs(1);

    struct Secret;

    impl PublicKeyGenerator for Secret {
        type PublicKey = ();

        fn generate(&self) -> Option<()> {
            Some(())
        }
    }

    #[derive(Clone)]
    struct FixedHelper;

    impl ProverHelper for FixedHelper {
        type Key = Secret;
        type Proof = &'static str;
        type Response = bool;

        fn generate(&mut self, _key: &PrivateKey<Secret>) -> &'static str {
            "proof"
        }

        fn left(&mut self, _key: &PrivateKey<Secret>) -> bool {
            true
        }

        fn right(&mut self, _key: &PrivateKey<Secret>) -> bool {
            false
        }
    }

    /// Numbers each proof and answers with the number of the round it opened.
    #[derive(Clone, Default)]
    struct NumberedHelper {
        issued: Arc<AtomicU64>,
        current: u64,
    }

    impl ProverHelper for NumberedHelper {
        type Key = Secret;
        type Proof = u64;
        type Response = u64;

        fn generate(&mut self, _key: &PrivateKey<Secret>) -> u64 {
            self.current = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            self.current
        }

        fn left(&mut self, _key: &PrivateKey<Secret>) -> u64 {
            self.current
        }

        fn right(&mut self, _key: &PrivateKey<Secret>) -> u64 {
            self.current
        }
    }

    fn actor() -> (
        ProverActor<FixedHelper>,
        ProverEvents<&'static str, bool>,
    ) {
        ProverActor::new(Arc::new(PrivateKey::with_generator(Secret)), FixedHelper)
    }

    #[tokio::test]
    async fn next_round_emits_proof() {
        let (mut prover, mut events) = actor();

        let (sent, proof) = tokio::join!(prover.next_round(), events.proof.recv_timeout(WAIT));
        sent.unwrap();
        assert_eq!(proof.unwrap(), "proof");
        assert!(prover.is_awaiting_challenge());
        assert_eq!(prover.rounds_started(), 1);
    }

    #[tokio::test]
    async fn challenge_before_proof_is_out_of_order() {
        let (mut prover, mut events) = actor();

        let (sent, outcome) = tokio::join!(prover.challenge(Challenge::Left), async {
            tokio::select! {
                Some(err) = events.error.recv() => Ok(err),
                Some(_) = events.response.recv() => Err("unexpected response"),
                _ = tokio::time::sleep(WAIT) => Err("timed out"),
            }
        });
        sent.unwrap();
        assert_eq!(outcome.unwrap(), ProverError);
        assert!(!prover.is_awaiting_challenge());
    }

    #[tokio::test]
    async fn challenge_after_proof_emits_response() {
        let (mut prover, mut events) = actor();

        let (sent, _) = tokio::join!(prover.next_round(), events.proof.recv());
        sent.unwrap();

        let (sent, response) = tokio::join!(
            prover.challenge(Challenge::Left),
            events.response.recv_timeout(WAIT)
        );
        sent.unwrap();
        assert!(response.unwrap());
        assert!(!prover.is_awaiting_challenge());
    }

    #[tokio::test]
    async fn second_challenge_in_same_round_is_out_of_order() {
        let (mut prover, mut events) = actor();

        let (sent, _) = tokio::join!(prover.next_round(), events.proof.recv());
        sent.unwrap();
        let (sent, _) = tokio::join!(
            prover.challenge(Challenge::Right),
            events.response.recv()
        );
        sent.unwrap();

        let (sent, err) = tokio::join!(
            prover.challenge(Challenge::Right),
            events.error.recv_timeout(WAIT)
        );
        sent.unwrap();
        assert_eq!(err.unwrap(), ProverError);
    }

    #[tokio::test]
    async fn next_round_replaces_unanswered_round() {
        let key = Arc::new(PrivateKey::with_generator(Secret));
        let (mut prover, mut events) = ProverActor::new(key, NumberedHelper::default());

        let (sent, first) = tokio::join!(prover.next_round(), events.proof.recv_timeout(WAIT));
        sent.unwrap();
        let (sent, second) = tokio::join!(prover.next_round(), events.proof.recv_timeout(WAIT));
        sent.unwrap();
        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 2);
        assert_eq!(prover.rounds_started(), 2);
        assert!(prover.is_awaiting_challenge());

        let (sent, response) = tokio::join!(
            prover.challenge(Challenge::Left),
            events.response.recv_timeout(WAIT)
        );
        sent.unwrap();
        assert_eq!(response.unwrap(), 2);
        assert!(!prover.is_awaiting_challenge());

        // The discarded round cannot be answered afterwards.
        let (sent, err) = tokio::join!(
            prover.challenge(Challenge::Left),
            events.error.recv_timeout(WAIT)
        );
        sent.unwrap();
        assert_eq!(err.unwrap(), ProverError);
    }

    #[tokio::test]
    async fn dropped_listener_surfaces_as_error() {
        let (mut prover, events) = actor();
        drop(events);

        let err = prover.next_round().await.unwrap_err();
        assert!(matches!(err, crate::Error::ChannelClosed("proof")));
    }
}
