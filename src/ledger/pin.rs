use std::sync::Arc;

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Algorithm, Argon2, Params, Version,
};
use tracing::info;

use super::{
  account::{AccountId, AccountStore},
  error::{LedgerError, Result},
};
use crate::config::PinConfig;

const PIN_LENGTH: usize = 4;

const COMMON_PINS: [&str; 11] = [
  "1234", "0000", "1111", "2222", "3333", "4444", "5555", "6666", "7777", "8888", "9999",
];

/// Verifies and manages the transaction PIN of the accounts.
///
/// PINs are stored as salted argon2id hashes. Verification compares the derived hashes
/// in constant time, and the hashing itself runs on the blocking thread pool.
pub struct PinAuthenticator {
  accounts: Arc<AccountStore>,
  hasher: Argon2<'static>,
}

impl PinAuthenticator {
  pub fn new(accounts: Arc<AccountStore>, config: &PinConfig) -> anyhow::Result<Self> {
    let params = Params::new(
      config.memory_kib,
      config.iterations,
      config.parallelism,
      None,
    )
    .map_err(|err| anyhow::anyhow!("invalid PIN hashing parameters: {}", err))?;

    Ok(Self {
      accounts,
      hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
    })
  }

  /// Returns whether `pin` matches the account credential. An account without PIN never matches.
  pub async fn verify(&self, account: AccountId, pin: &str) -> Result<bool> {
    let stored = self
      .accounts
      .find_by_id(account)
      .await?
      .ok_or(LedgerError::AccountNotFound(account))?
      .pin_hash;

    match stored {
      Some(hash) => self.matches(pin, hash).await,
      None => Ok(false),
    }
  }

  /// Stores the first PIN of an account. It fails with [`LedgerError::InvalidState`] if a PIN is already set.
  pub async fn set_initial_pin(&self, account: AccountId, pin: &str) -> Result<()> {
    validate_pin(pin)?;
    let hash = self.hash(pin).await?;

    let mut guard = self.accounts.lock(account).await?;
    if guard.has_pin() {
      return Err(LedgerError::InvalidState(format!(
        "account {} already has a PIN",
        account
      )));
    }
    guard.pin_hash = Some(hash);
    info!(account, "transaction PIN created");
    Ok(())
  }

  /// Replaces the PIN after a successful verification of the current one.
  pub async fn change_pin(&self, account: AccountId, current: &str, new: &str) -> Result<()> {
    if !self.verify(account, current).await? {
      return Err(LedgerError::Authentication);
    }
    validate_pin(new)?;
    let hash = self.hash(new).await?;

    self.accounts.lock(account).await?.pin_hash = Some(hash);
    info!(account, "transaction PIN changed");
    Ok(())
  }

  async fn hash(&self, pin: &str) -> Result<String> {
    let hasher = self.hasher.clone();
    let pin = pin.to_string();
    tokio::task::spawn_blocking(move || {
      let salt = SaltString::generate(&mut OsRng);
      hasher
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| LedgerError::Persistence(format!("PIN hashing failed: {}", err)))
    })
    .await
    .map_err(|err| LedgerError::Persistence(format!("PIN hashing task failed: {}", err)))?
  }

  async fn matches(&self, pin: &str, hash: String) -> Result<bool> {
    let hasher = self.hasher.clone();
    let pin = pin.to_string();
    tokio::task::spawn_blocking(move || {
      let parsed = PasswordHash::new(&hash)
        .map_err(|err| LedgerError::Persistence(format!("corrupted PIN hash: {}", err)))?;
      Ok(hasher.verify_password(pin.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|err| LedgerError::Persistence(format!("PIN verification task failed: {}", err)))?
  }
}

/// A PIN has exactly four digits, not all of them equal, and is not one of the common ones.
pub fn validate_pin(pin: &str) -> Result<()> {
  if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
    return Err(LedgerError::validation("PIN must be exactly 4 digits"));
  }
  if pin.chars().all(|c| Some(c) == pin.chars().next()) {
    return Err(LedgerError::validation("PIN cannot be all same digits"));
  }
  if COMMON_PINS.contains(&pin) {
    return Err(LedgerError::validation("PIN is too common"));
  }
  Ok(())
}

#[cfg(test)]
pub(crate) fn test_pin_config() -> PinConfig {
  PinConfig {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
  }
}
