//! Runtime configuration of the ledger.
//!
//! Every field has a default, so an empty (or missing) YAML document yields a working configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Environment variable holding the path of the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "WALLET_LEDGER_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
  pub fraud: FraudConfig,
  pub pin: PinConfig,
  pub locking: LockConfig,
  pub logging: LoggingConfig,
}

/// Thresholds of the pre-transfer fraud screening.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
  pub velocity_threshold: Decimal,
  pub velocity_window_minutes: i64,
  pub large_single_threshold: Decimal,
}

impl Default for FraudConfig {
  fn default() -> Self {
    Self {
      velocity_threshold: Decimal::from(50_000),
      velocity_window_minutes: 60,
      large_single_threshold: Decimal::from(100_000),
    }
  }
}

/// Argon2id cost parameters used to hash transaction PINs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinConfig {
  pub memory_kib: u32,
  pub iterations: u32,
  pub parallelism: u32,
}

impl Default for PinConfig {
  fn default() -> Self {
    Self {
      memory_kib: argon2::Params::DEFAULT_M_COST,
      iterations: argon2::Params::DEFAULT_T_COST,
      parallelism: argon2::Params::DEFAULT_P_COST,
    }
  }
}

/// Bounds on how long a transfer waits for account locks before giving up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LockConfig {
  pub acquire_timeout_ms: u64,
  pub max_retries: u32,
  pub backoff_ms: u64,
}

impl LockConfig {
  pub fn acquire_timeout(&self) -> Duration {
    Duration::from_millis(self.acquire_timeout_ms)
  }

  /// Linear backoff before retry number `attempt` (starting at 1).
  pub fn backoff(&self, attempt: u32) -> Duration {
    Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
  }
}

impl Default for LockConfig {
  fn default() -> Self {
    Self {
      acquire_timeout_ms: 250,
      max_retries: 3,
      backoff_ms: 10,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  pub level: String,
  pub json: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      json: false,
    }
  }
}

impl LedgerConfig {
  /// Loads the configuration from the file named by [`CONFIG_PATH_ENV`], or the defaults when it is not set.
  pub fn load() -> Result<Self> {
    match std::env::var_os(CONFIG_PATH_ENV) {
      Some(path) => Self::from_file(path),
      None => Ok(Self::default()),
    }
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("reading configuration from {}", path.display()))?;
    Self::from_yaml(&content)
  }

  pub fn from_yaml(content: &str) -> Result<Self> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(content).context("parsing ledger configuration")
  }
}
