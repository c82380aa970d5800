use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
  account::AccountId,
  error::{LedgerError, Result},
  transaction::{Transaction, TransactionId},
};

const MAX_BILL_NUMBER_LENGTH: usize = 50;

/// Alias for a bill ID
pub type BillId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
  Electricity,
  Gas,
  Water,
  Internet,
  Mobile,
}

impl fmt::Display for BillType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BillType::Electricity => "electricity",
      BillType::Gas => "gas",
      BillType::Water => "water",
      BillType::Internet => "internet",
      BillType::Mobile => "mobile",
    };
    f.write_str(name)
  }
}

impl FromStr for BillType {
  type Err = LedgerError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "electricity" => Ok(BillType::Electricity),
      "gas" => Ok(BillType::Gas),
      "water" => Ok(BillType::Water),
      "internet" => Ok(BillType::Internet),
      "mobile" => Ok(BillType::Mobile),
      other => Err(LedgerError::Validation(format!("unknown bill type: {}", other))),
    }
  }
}

/// Reference of a bill held by an external biller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillReference {
  pub bill_type: BillType,
  pub bill_number: String,
}

impl BillReference {
  pub fn new(bill_type: BillType, bill_number: &str) -> Result<Self> {
    let bill_number = bill_number.trim();
    if bill_number.is_empty() {
      Err(LedgerError::validation("bill number is required"))
    } else if bill_number.chars().count() > MAX_BILL_NUMBER_LENGTH {
      Err(LedgerError::validation(
        "bill number is longer than 50 characters",
      ))
    } else {
      Ok(Self {
        bill_type,
        bill_number: bill_number.to_string(),
      })
    }
  }

  pub fn description(&self) -> String {
    format!("{} bill payment - {}", self.bill_type, self.bill_number)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
  pub id: BillId,
  pub account: AccountId,
  pub bill_type: BillType,
  pub bill_number: String,
  pub amount: Decimal,
  pub is_paid: bool,
  pub paid_at: Option<DateTime<Utc>>,
  pub transaction_id: TransactionId,
}

/// Record of the bills paid through the wallet.
#[derive(Debug)]
pub struct BillRegistry {
  bills: RwLock<Vec<Bill>>,
  next_id: AtomicU64,
}

impl Default for BillRegistry {
  fn default() -> Self {
    Self {
      bills: RwLock::default(),
      next_id: AtomicU64::new(1),
    }
  }
}

impl BillRegistry {
  /// Records a bill of `account` as paid by the given completed transaction.
  ///
  /// Recording cannot fail: the payment has already been committed when it runs.
  pub fn record_paid(&self, account: AccountId, reference: BillReference, transaction: &Transaction) -> Bill {
    let bill = Bill {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      account,
      bill_type: reference.bill_type,
      bill_number: reference.bill_number,
      amount: transaction.amount,
      is_paid: true,
      paid_at: transaction.completed_at,
      transaction_id: transaction.id,
    };
    self
      .bills
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .push(bill.clone());
    bill
  }

  pub fn bills_of(&self, account: AccountId) -> Result<Vec<Bill>> {
    let bills = self
      .bills
      .read()
      .map_err(|_| LedgerError::Persistence("bill registry lock poisoned".to_string()))?;
    Ok(
      bills
        .iter()
        .filter(|bill| bill.account == account)
        .cloned()
        .collect(),
    )
  }
}
