use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use iterative_zkp::relations::discrete_log::{DlogGroup, DlogProver, DlogSecret, DlogVerifier};
use iterative_zkp::relations::graph_isomorphism::{GraphProver, GraphSecret, GraphVerifier};
use iterative_zkp::{PrivateKey, Prover, SecureRng, Session, SessionConfig, Verifier};

fn bench_dlog_round(c: &mut Criterion) {
    let group = Arc::new(DlogGroup::rfc5114());
    let mut rng = SecureRng::default();
    let key = Arc::new(PrivateKey::with_generator(DlogSecret::random(
        Arc::clone(&group),
        &mut rng,
    )));
    let public_key = Arc::new(key.public_key().unwrap().clone());
    let helper = Arc::new(DlogVerifier::new(group));

    c.bench_function("dlog_rfc5114_round", |b| {
        b.iter(|| {
            let mut prover = Prover::new(Arc::clone(&key), DlogProver::new());
            let proof = prover.construct_proof();
            let verifier =
                Verifier::new(Arc::clone(&public_key), proof, Arc::clone(&helper), &mut rng)
                    .unwrap();
            let response = prover.respond(verifier.challenge());
            verifier.verify(black_box(&response))
        })
    });
}

fn bench_graph_round(c: &mut Criterion) {
    let mut rng = SecureRng::default();
    let key = Arc::new(PrivateKey::with_generator(GraphSecret::random(32, &mut rng)));
    let public_key = Arc::new(key.public_key().unwrap().clone());
    let helper = Arc::new(GraphVerifier);

    c.bench_function("graph_32_round", |b| {
        b.iter(|| {
            let mut prover = Prover::new(Arc::clone(&key), GraphProver::new());
            let proof = prover.construct_proof();
            let verifier =
                Verifier::new(Arc::clone(&public_key), proof, Arc::clone(&helper), &mut rng)
                    .unwrap();
            let response = prover.respond(verifier.challenge());
            verifier.verify(black_box(&response))
        })
    });
}

fn bench_dlog_session(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let group = Arc::new(DlogGroup::rfc5114());
    let key = Arc::new(PrivateKey::with_generator(DlogSecret::random(
        Arc::clone(&group),
        &mut SecureRng::default(),
    )));
    let public_key = key.public_key().unwrap().clone();

    c.bench_function("dlog_rfc5114_session_20_rounds", |b| {
        b.to_async(&runtime).iter(|| {
            let session = Session::new(
                Arc::clone(&key),
                DlogProver::new(),
                public_key.clone(),
                DlogVerifier::new(Arc::clone(&group)),
                SessionConfig::with_rounds(20),
            )
            .unwrap();
            async move { session.run().await.unwrap() }
        })
    });
}

criterion_group!(
    benches,
    bench_dlog_round,
    bench_graph_round,
    bench_dlog_session
);
criterion_main!(benches);
