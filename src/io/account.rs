use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{self, AccountId, AMOUNT_SCALE};

/// A report on an account state used to serialize into a CSV file
#[derive(Debug, PartialEq, Serialize)]
pub struct AccountReport {
  account: AccountId,
  owner: String,
  balance: Decimal,
  blocked: bool,
}

impl From<ledger::AccountReport> for AccountReport {
  /// A conversion between the domain representation of an account report into a serializable structure
  fn from(account_report: ledger::AccountReport) -> Self {
    AccountReport {
      account: account_report.account_id,
      owner: account_report.owner,
      balance: with_amount_scale(account_report.balance),
      blocked: account_report.blocked,
    }
  }
}

fn with_amount_scale(mut value: Decimal) -> Decimal {
  value.rescale(AMOUNT_SCALE);
  if value.is_zero() {
    value.set_sign_positive(true);
  }
  value
}
