//! Configuration loading and validation for the `aesgcm` command.
//!
//! All values are read from `AESGCM_`-prefixed environment variables. Keys are
//! passed base64 encoded in `AESGCM_KEY`; nothing is read from or written to
//! disk.

use std::fmt;

use aesgcm::{KeySize, SecretKey};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

/// Prefix shared by every variable, e.g. `AESGCM_KEY`.
const ENV_PREFIX: &str = "AESGCM";

/// Validated command configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded AES key. Required by `encrypt` and `decrypt`.
    #[serde(default)]
    pub key: Option<String>,

    /// Size in bits of keys produced by `keygen`.
    #[serde(default = "default_key_bits")]
    pub key_bits: u32,

    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_bits() -> u32 {
    256
}
fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.key_size()?;
        if self.key.is_some() {
            self.secret_key()?;
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("AESGCM_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Key size requested for `keygen`.
    pub fn key_size(&self) -> Result<KeySize> {
        KeySize::try_from(self.key_bits).context("AESGCM_KEY_BITS is invalid")
    }

    /// Decode the configured key.
    ///
    /// # Errors
    ///
    /// Returns an error if `AESGCM_KEY` is unset, is not base64, or does not
    /// decode to 16, 24 or 32 bytes.
    pub fn secret_key(&self) -> Result<SecretKey> {
        let encoded = self
            .key
            .as_deref()
            .context("AESGCM_KEY is required for this command")?;
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .context("AESGCM_KEY is not valid base64")?,
        );
        SecretKey::from_bytes(&bytes).context("AESGCM_KEY has an unsupported length")
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_bits", &self.key_bits)
            .field("log_level", &self.log_level)
            .finish()
    }
}
