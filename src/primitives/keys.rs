//! Key pair abstraction: a private key that derives its public key lazily.

use std::sync::OnceLock;

use tracing::debug;

use crate::{Error, Result};

/// Derives the public half of a key pair from private key material.
///
/// Implementors are the relation-specific secrets (a discrete-log exponent, a
/// graph permutation, ...). Returning `None` signals that derivation failed.
pub trait PublicKeyGenerator {
    /// The public key produced by this generator.
    type PublicKey: Clone;

    /// Derives the public key. Called at most once per successful derivation.
    fn generate(&self) -> Option<Self::PublicKey>;
}

/// Private key paired with a lazily derived, cached public key.
///
/// The generator doubles as the private key material and is never mutated. The
/// public key is written once, on the first successful call to
/// [`PrivateKey::public_key`], and read-only afterwards.
pub struct PrivateKey<G: PublicKeyGenerator> {
    generator: G,
    public_key: OnceLock<G::PublicKey>,
}

impl<G: PublicKeyGenerator> PrivateKey<G> {
    /// Creates a private key from an optional generator.
    ///
    /// Fails with [`Error::NilGenerator`] when no generator is supplied.
    pub fn new(generator: Option<G>) -> Result<Self> {
        generator.map(Self::with_generator).ok_or(Error::NilGenerator)
    }

    /// Creates a private key from a generator the caller already holds.
    pub fn with_generator(generator: G) -> Self {
        Self {
            generator,
            public_key: OnceLock::new(),
        }
    }

    /// Returns the public key, deriving it on first use.
    ///
    /// A generator that yields no key is reported as [`Error::Construction`]
    /// and nothing is cached, so a later call may retry. Once derived, the same
    /// value is returned without invoking the generator again.
    pub fn public_key(&self) -> Result<&G::PublicKey> {
        if let Some(public_key) = self.public_key.get() {
            return Ok(public_key);
        }

        let derived = self.generator.generate().ok_or_else(|| {
            Error::Construction("Public key generator yielded no key".to_string())
        })?;
        debug!("derived public key");

        Ok(self.public_key.get_or_init(|| derived))
    }

    /// Returns the private key material.
    pub fn generator(&self) -> &G {
        &self.generator
    }
}
