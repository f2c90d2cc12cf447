//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use iterative_zkp::relations::discrete_log::{DlogGroup, DlogPublicKey, DlogSecret};
use iterative_zkp::{PrivateKey, SecureRng};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from the library are shown. Subsequent calls are safe and will be
/// ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("iterative_zkp=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Fresh discrete-log key pair in `group`.
pub fn dlog_key(group: &Arc<DlogGroup>) -> (Arc<PrivateKey<DlogSecret>>, DlogPublicKey) {
    let secret = DlogSecret::random(Arc::clone(group), &mut SecureRng::default());
    let key = Arc::new(PrivateKey::with_generator(secret));
    let public_key = key.public_key().unwrap().clone();
    (key, public_key)
}
