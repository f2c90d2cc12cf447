use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound on rounds; 256 rounds already leaves a cheater `2^-256`.
pub const MAX_ROUNDS: u64 = 256;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of rounds the verifier must see answered correctly.
    pub rounds: u64,
    /// How long the driver waits on any single protocol step, in milliseconds.
    pub step_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            step_timeout_ms: 5_000,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration for `rounds` rounds with the default timeout.
    pub fn with_rounds(rounds: u64) -> Self {
        Self {
            rounds,
            ..Self::default()
        }
    }

    /// Loads configuration from `.env` file, TOML file, and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `ZKP_` prefix (e.g., `ZKP_ROUNDS=40`)
    /// 2. TOML configuration file (if exists)
    /// 3. `.env` file (if exists)
    /// 4. Built-in defaults
    ///
    /// The TOML file path can be set via `ZKP_CONFIG_PATH`. If not set, defaults
    /// to `./config/session.toml`. A missing file is silently skipped.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// ZKP_ROUNDS=40
    /// ZKP_STEP_TIMEOUT_MS=2000
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a source is malformed.
    pub fn from_env() -> Result<Self> {
        use figment::Figment;
        use figment::providers::{Env, Format, Serialized, Toml};

        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("ZKP_CONFIG_PATH")
            .unwrap_or_else(|_| "config/session.toml".to_string());

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("ZKP_").ignore(&["CONFIG_PATH"]))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::Config("rounds cannot be zero".to_string()));
        }

        if self.rounds > MAX_ROUNDS {
            return Err(Error::Config(format!(
                "rounds cannot exceed {MAX_ROUNDS} (got {})",
                self.rounds
            )));
        }

        if self.step_timeout_ms == 0 {
            return Err(Error::Config("step_timeout_ms cannot be zero".to_string()));
        }

        Ok(())
    }

    /// Per-step timeout as a [`Duration`].
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Upper bound on a cheating prover's chance of passing every round.
    pub fn soundness_error(&self) -> f64 {
        0.5f64.powi(self.rounds.min(i32::MAX as u64) as i32)
    }
}
