use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;

/// System generated identifier of a ledger transaction. It is never supplied by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
  pub fn generate() -> Self {
    Self(Uuid::new_v4())
  }
}

impl fmt::Display for TransactionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.simple())
  }
}

impl FromStr for TransactionId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

/// The kinds of fund movements recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
  Send,
  BillPayment,
  QrPayment,
  Deposit,
  Withdrawal,
}

impl TransactionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      TransactionType::Send => "send",
      TransactionType::BillPayment => "bill_payment",
      TransactionType::QrPayment => "qr_payment",
      TransactionType::Deposit => "deposit",
      TransactionType::Withdrawal => "withdrawal",
    }
  }
}

impl fmt::Display for TransactionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Lifecycle of a transaction record: `Pending` moves once to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
  Cancelled,
}

impl TransactionStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, TransactionStatus::Pending)
  }
}

/// An immutable ledger record.
///
/// A transaction has one of the following shapes:
/// - sender and receiver: peer or QR transfer between two internal accounts
/// - sender only: withdrawal or bill payment (the receiver is outside the system)
/// - receiver only: deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub id: TransactionId,
  pub sender: Option<AccountId>,
  pub receiver: Option<AccountId>,
  #[serde(rename = "type")]
  pub kind: TransactionType,
  pub amount: Decimal,
  pub status: TransactionStatus,
  pub description: String,
  pub created_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
  /// Builds a record for a fund movement that has just been applied.
  pub fn completed(
    sender: Option<AccountId>,
    receiver: Option<AccountId>,
    kind: TransactionType,
    amount: Decimal,
    description: String,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: TransactionId::generate(),
      sender,
      receiver,
      kind,
      amount,
      status: TransactionStatus::Completed,
      description,
      created_at: now,
      completed_at: Some(now),
    }
  }

  pub fn involves(&self, account: AccountId) -> bool {
    self.sender == Some(account) || self.receiver == Some(account)
  }

  /// The other internal party of the transaction as seen from `account`, if any.
  pub fn counterparty_of(&self, account: AccountId) -> Option<AccountId> {
    match (self.sender, self.receiver) {
      (Some(sender), receiver) if sender == account => receiver,
      (sender, Some(receiver)) if receiver == account => sender,
      _ => None,
    }
  }
}
