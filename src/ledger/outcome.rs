use rust_decimal::Decimal;
use serde::Serialize;

use super::{
  engine::AMOUNT_SCALE,
  error::{ErrorKind, LedgerError},
  transaction::{Transaction, TransactionId},
};

/// Result of a ledger operation in the shape consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferOutcome {
  pub ok: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_kind: Option<ErrorKind>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub transaction_id: Option<TransactionId>,
  pub amount: Decimal,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub counterparty_name: Option<String>,
}

impl TransferOutcome {
  pub fn success(transaction: &Transaction, counterparty_name: Option<String>) -> Self {
    Self {
      ok: true,
      error_kind: None,
      transaction_id: Some(transaction.id),
      amount: transaction.amount.round_dp(AMOUNT_SCALE),
      counterparty_name,
    }
  }

  pub fn failure(error: &LedgerError, amount: Decimal) -> Self {
    Self {
      ok: false,
      error_kind: Some(error.kind()),
      transaction_id: None,
      amount: amount.round_dp(AMOUNT_SCALE),
      counterparty_name: None,
    }
  }

  pub fn from_result(
    result: &Result<Transaction, LedgerError>,
    amount: Decimal,
    counterparty_name: Option<String>,
  ) -> Self {
    match result {
      Ok(transaction) => Self::success(transaction, counterparty_name),
      Err(error) => Self::failure(error, amount),
    }
  }
}
