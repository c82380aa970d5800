use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber. Logs go to stderr, stdout is reserved for the accounts report.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(&config.level)?,
  };
  let registry = tracing_subscriber::registry().with(filter);

  let installed = if config.json {
    registry
      .with(fmt::layer().json().with_writer(std::io::stderr))
      .try_init()
  } else {
    registry
      .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
      .try_init()
  };
  installed.map_err(|err| anyhow!("cannot install the log subscriber: {}", err))
}
