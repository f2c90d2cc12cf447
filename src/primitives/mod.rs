//! Building blocks shared by the protocol layers.
//!
//! - **keys**: private keys with lazily derived public keys
//! - **challenge**: the binary challenge and how it is drawn
//! - **rng**: the default cryptographically secure randomness source

/// Binary challenge type.
pub mod challenge;
/// Key pair abstraction.
pub mod keys;
/// Secure randomness.
pub mod rng;

pub use challenge::Challenge;
pub use keys::{PrivateKey, PublicKeyGenerator};
pub use rng::SecureRng;
