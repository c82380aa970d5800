use serde::Serialize;
use thiserror::Error;

use super::{
  account::AccountId, fraud::FraudReason, requests::MoneyRequestId, transaction::TransactionId,
};

pub type Result<T> = core::result::Result<T, LedgerError>;

/// Possible errors that can happen while moving funds.
///
/// Everything except [`LedgerError::Persistence`] is reported before any balance is touched,
/// so a caller receiving one of them can assume the ledger is exactly as it was.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
  #[error("Invalid request: {0}")]
  Validation(String),

  #[error("PIN verification failed")]
  Authentication,

  #[error("Not enough available funds")]
  InsufficientFunds,

  #[error("Account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("Counterparty not found: {0}")]
  CounterpartyNotFound(String),

  #[error("Account is blocked: {0}")]
  AccountBlocked(AccountId),

  #[error("Transfer blocked for security reasons: {0}")]
  FraudBlocked(FraudReason),

  #[error("Account {0} is busy, try again later")]
  ConcurrencyConflict(AccountId),

  #[error("Invalid state: {0}")]
  InvalidState(String),

  #[error("Money request not found: {0}")]
  MoneyRequestNotFound(MoneyRequestId),

  #[error("Transaction not found: {0}")]
  TransactionNotFound(TransactionId),

  #[error("Not authorized to access this resource")]
  Forbidden,

  #[error("Persistence failure: {0}")]
  Persistence(String),
}

/// Stable label of a [`LedgerError`] handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  ValidationError,
  AuthenticationError,
  InsufficientFunds,
  CounterpartyNotFound,
  AccountBlocked,
  FraudBlocked,
  ConcurrencyConflict,
  InvalidState,
  NotFound,
  Forbidden,
  PersistenceError,
}

impl LedgerError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      LedgerError::Validation(_) => ErrorKind::ValidationError,
      LedgerError::Authentication => ErrorKind::AuthenticationError,
      LedgerError::InsufficientFunds => ErrorKind::InsufficientFunds,
      LedgerError::CounterpartyNotFound(_) => ErrorKind::CounterpartyNotFound,
      LedgerError::AccountBlocked(_) => ErrorKind::AccountBlocked,
      LedgerError::FraudBlocked(_) => ErrorKind::FraudBlocked,
      LedgerError::ConcurrencyConflict(_) => ErrorKind::ConcurrencyConflict,
      LedgerError::InvalidState(_) => ErrorKind::InvalidState,
      LedgerError::AccountNotFound(_)
      | LedgerError::MoneyRequestNotFound(_)
      | LedgerError::TransactionNotFound(_) => ErrorKind::NotFound,
      LedgerError::Forbidden => ErrorKind::Forbidden,
      LedgerError::Persistence(_) => ErrorKind::PersistenceError,
    }
  }

  pub(crate) fn validation(message: impl Into<String>) -> Self {
    LedgerError::Validation(message.into())
  }
}
