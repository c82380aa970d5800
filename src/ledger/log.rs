use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{
  account::AccountId,
  error::{LedgerError, Result},
  transaction::{Transaction, TransactionId, TransactionStatus},
};

/// Append-only store of transaction records.
///
/// The operations are `async` so that an implementation backed by a database can be plugged in.
#[async_trait]
pub trait TransactionLog: Send + Sync {
  /// Appends a new record. Records are never updated or removed afterwards.
  async fn insert(&self, transaction: Transaction) -> Result<()>;

  async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>>;

  /// Every record where `account` is the sender or the receiver, newest first.
  async fn history(&self, account: AccountId) -> Result<Vec<Transaction>>;

  /// Sum of the completed transfers sent by `account` created at or after `since`.
  async fn outgoing_completed_since(
    &self,
    account: AccountId,
    since: DateTime<Utc>,
  ) -> Result<Decimal>;
}

/// Implementation of the [`TransactionLog`] that keeps the records in memory.
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
  records: RwLock<Records>,
}

#[derive(Debug, Default)]
struct Records {
  transactions: Vec<Transaction>,
  index: HashMap<TransactionId, usize>,
}

impl InMemoryTransactionLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self
      .records
      .read()
      .map(|records| records.transactions.len())
      .unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
  async fn insert(&self, transaction: Transaction) -> Result<()> {
    let mut records = self.records.write().map_err(poisoned)?;
    if records.index.contains_key(&transaction.id) {
      return Err(LedgerError::Persistence(format!(
        "duplicated transaction id {}",
        transaction.id
      )));
    }
    let position = records.transactions.len();
    records.index.insert(transaction.id, position);
    records.transactions.push(transaction);
    Ok(())
  }

  async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>> {
    let records = self.records.read().map_err(poisoned)?;
    Ok(
      records
        .index
        .get(id)
        .map(|position| records.transactions[*position].clone()),
    )
  }

  async fn history(&self, account: AccountId) -> Result<Vec<Transaction>> {
    let records = self.records.read().map_err(poisoned)?;
    let mut history: Vec<Transaction> = records
      .transactions
      .iter()
      .filter(|transaction| transaction.involves(account))
      .cloned()
      .collect();
    history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(history)
  }

  async fn outgoing_completed_since(
    &self,
    account: AccountId,
    since: DateTime<Utc>,
  ) -> Result<Decimal> {
    let records = self.records.read().map_err(poisoned)?;
    Ok(
      records
        .transactions
        .iter()
        .filter(|transaction| {
          transaction.sender == Some(account)
            && transaction.status == TransactionStatus::Completed
            && transaction.created_at >= since
        })
        .map(|transaction| transaction.amount)
        .sum(),
    )
  }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> LedgerError {
  LedgerError::Persistence("transaction log lock poisoned".to_string())
}
