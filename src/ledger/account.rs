use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::error::{LedgerError, Result};
use crate::config::LockConfig;

/// Alias for an account ID
pub type AccountId = u64;

/// Exclusive access to one account for the duration of an atomic scope.
pub type AccountGuard = OwnedMutexGuard<Account>;

/// The state of a wallet account.
///
/// Balances are only ever changed through [`Account::debit`] and [`Account::credit`],
/// each of which bumps `version`.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
  pub id: AccountId,
  pub owner: String,
  pub phone: Option<String>,
  pub balance: Decimal,
  pub pin_hash: Option<String>,
  pub version: u64,
  pub blocked: bool,
}

impl Account {
  pub fn new(id: AccountId, owner: impl Into<String>) -> Self {
    Self {
      id,
      owner: owner.into(),
      phone: None,
      balance: Decimal::ZERO,
      pin_hash: None,
      version: 0,
      blocked: false,
    }
  }

  pub fn with_phone(self, phone: impl Into<String>) -> Self {
    Self {
      phone: Some(phone.into()),
      ..self
    }
  }

  pub fn with_balance(self, balance: Decimal) -> Self {
    Self { balance, ..self }
  }

  pub fn has_pin(&self) -> bool {
    self.pin_hash.is_some()
  }

  pub fn ensure_active(&self) -> Result<()> {
    if self.blocked {
      Err(LedgerError::AccountBlocked(self.id))
    } else {
      Ok(())
    }
  }

  pub fn debit(&mut self, amount: Decimal) -> Result<()> {
    if self.balance < amount {
      Err(LedgerError::InsufficientFunds)
    } else {
      self.balance -= amount;
      self.version += 1;
      Ok(())
    }
  }

  pub fn credit(&mut self, amount: Decimal) -> Result<()> {
    self.balance = self
      .balance
      .checked_add(amount)
      .ok_or_else(|| LedgerError::validation("balance overflow"))?;
    self.version += 1;
    Ok(())
  }
}

/// Account report structure used to export information about the state of the accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountReport {
  pub account_id: AccountId,
  pub owner: String,
  pub balance: Decimal,
  pub blocked: bool,
}

impl AccountReport {
  pub fn new(account_id: AccountId, owner: impl Into<String>, balance: Decimal, blocked: bool) -> Self {
    Self {
      account_id,
      owner: owner.into(),
      balance,
      blocked,
    }
  }
}

impl From<&Account> for AccountReport {
  fn from(account: &Account) -> Self {
    AccountReport::new(account.id, account.owner.clone(), account.balance, account.blocked)
  }
}

/// In-memory repository of accounts with per-account mutual exclusion.
///
/// Every balance mutation happens while holding the account's lock, so concurrent debits and credits
/// on the same account are linearizable. When two accounts are needed, locks are always taken in
/// ascending [`AccountId`] order.
#[derive(Debug)]
pub struct AccountStore {
  accounts: RwLock<HashMap<AccountId, Arc<Mutex<Account>>>>,
  phones: RwLock<HashMap<String, AccountId>>,
  locking: LockConfig,
}

impl AccountStore {
  pub fn new(locking: LockConfig) -> Self {
    Self {
      accounts: RwLock::default(),
      phones: RwLock::default(),
      locking,
    }
  }

  /// Registers an account created by the identity layer.
  pub fn insert(&self, account: Account) -> Result<()> {
    if account.balance < Decimal::ZERO {
      return Err(LedgerError::validation("opening balance cannot be negative"));
    }

    let mut accounts = self.accounts.write().map_err(poisoned)?;
    let mut phones = self.phones.write().map_err(poisoned)?;

    if accounts.contains_key(&account.id) {
      return Err(LedgerError::Validation(format!(
        "account {} already exists",
        account.id
      )));
    }
    if let Some(phone) = &account.phone {
      if phones.contains_key(phone) {
        return Err(LedgerError::Validation(format!(
          "phone number {} already registered",
          phone
        )));
      }
      phones.insert(phone.clone(), account.id);
    }

    debug!(account = account.id, "account registered");
    accounts.insert(account.id, Arc::new(Mutex::new(account)));
    Ok(())
  }

  pub fn exists(&self, id: AccountId) -> bool {
    self
      .accounts
      .read()
      .map(|accounts| accounts.contains_key(&id))
      .unwrap_or(false)
  }

  /// Returns a snapshot of the account, or `None` if it does not exist.
  pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>> {
    match self.entry(id) {
      Ok(entry) => Ok(Some(entry.lock().await.clone())),
      Err(LedgerError::AccountNotFound(_)) => Ok(None),
      Err(err) => Err(err),
    }
  }

  pub fn find_by_phone(&self, phone: &str) -> Result<Option<AccountId>> {
    let phones = self.phones.read().map_err(poisoned)?;
    Ok(phones.get(phone).copied())
  }

  pub async fn get_balance(&self, id: AccountId) -> Result<Decimal> {
    Ok(self.entry(id)?.lock().await.balance)
  }

  pub async fn debit(&self, id: AccountId, amount: Decimal) -> Result<()> {
    self.lock(id).await?.debit(amount)
  }

  pub async fn credit(&self, id: AccountId, amount: Decimal) -> Result<()> {
    self.lock(id).await?.credit(amount)
  }

  pub async fn set_blocked(&self, id: AccountId, blocked: bool) -> Result<()> {
    let mut account = self.lock(id).await?;
    account.blocked = blocked;
    Ok(())
  }

  /// Acquires exclusive access to one account, retrying a bounded number of times.
  pub async fn lock(&self, id: AccountId) -> Result<AccountGuard> {
    let entry = self.entry(id)?;
    let mut attempt = 0;
    loop {
      match tokio::time::timeout(self.locking.acquire_timeout(), entry.clone().lock_owned()).await {
        Ok(guard) => return Ok(guard),
        Err(_) => attempt = self.retry_or_conflict(id, attempt).await?,
      }
    }
  }

  /// Acquires two distinct accounts in ascending id order and returns the guards as `(first, second)`.
  ///
  /// If the second lock cannot be taken in time the first one is released before backing off,
  /// so a waiting transfer never sits on a lock another transfer needs.
  pub async fn lock_pair(
    &self,
    first: AccountId,
    second: AccountId,
  ) -> Result<(AccountGuard, AccountGuard)> {
    if first == second {
      return Err(LedgerError::validation(
        "sender and receiver must be different accounts",
      ));
    }

    let first_entry = self.entry(first)?;
    let second_entry = self.entry(second)?;
    let (low, high, swapped) = if first < second {
      (first_entry, second_entry, false)
    } else {
      (second_entry, first_entry, true)
    };
    let (low_id, high_id) = (first.min(second), first.max(second));

    let timeout = self.locking.acquire_timeout();
    let mut attempt = 0;
    loop {
      let low_guard = match tokio::time::timeout(timeout, low.clone().lock_owned()).await {
        Ok(guard) => guard,
        Err(_) => {
          attempt = self.retry_or_conflict(low_id, attempt).await?;
          continue;
        }
      };
      match tokio::time::timeout(timeout, high.clone().lock_owned()).await {
        Ok(high_guard) if swapped => return Ok((high_guard, low_guard)),
        Ok(high_guard) => return Ok((low_guard, high_guard)),
        Err(_) => {
          drop(low_guard);
          attempt = self.retry_or_conflict(high_id, attempt).await?;
        }
      }
    }
  }

  /// Snapshot of every account, ordered by id.
  pub async fn accounts_report(&self) -> Result<Vec<AccountReport>> {
    let mut entries: Vec<(AccountId, Arc<Mutex<Account>>)> = {
      let accounts = self.accounts.read().map_err(poisoned)?;
      accounts
        .iter()
        .map(|(id, entry)| (*id, entry.clone()))
        .collect()
    };
    entries.sort_by_key(|(id, _)| *id);

    let mut report = Vec::with_capacity(entries.len());
    for (_, entry) in entries {
      report.push(AccountReport::from(&*entry.lock().await));
    }
    Ok(report)
  }

  async fn retry_or_conflict(&self, id: AccountId, attempt: u32) -> Result<u32> {
    let attempt = attempt + 1;
    if attempt > self.locking.max_retries {
      warn!(account = id, attempts = attempt, "giving up waiting for account lock");
      return Err(LedgerError::ConcurrencyConflict(id));
    }
    debug!(account = id, attempt, "account lock busy, backing off");
    tokio::time::sleep(self.locking.backoff(attempt)).await;
    Ok(attempt)
  }

  fn entry(&self, id: AccountId) -> Result<Arc<Mutex<Account>>> {
    let accounts = self.accounts.read().map_err(poisoned)?;
    accounts
      .get(&id)
      .cloned()
      .ok_or(LedgerError::AccountNotFound(id))
  }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> LedgerError {
  LedgerError::Persistence("account index lock poisoned".to_string())
}
