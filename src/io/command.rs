use std::convert::TryFrom;

use anyhow::{anyhow, Context, Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ledger::{self, AccountId, BillType};

/// The types of commands supported by the reader
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
  Open,
  Pin,
  Deposit,
  Withdrawal,
  Send,
  Bill,
}

/// A deserializable command record. The meaning of `counterparty` and `reference` depends on the type:
///
/// | type       | counterparty     | reference    |
/// |------------|------------------|--------------|
/// | open       | phone (optional) | owner name   |
/// | send       | receiver account | description  |
/// | bill       | bill type        | bill number  |
#[derive(Debug, Deserialize)]
pub struct Command {
  #[serde(rename = "type")]
  kind: CommandType,

  #[serde(rename = "account")]
  account_id: AccountId,

  counterparty: Option<String>,

  amount: Option<Decimal>,

  pin: Option<String>,

  reference: Option<String>,
}

impl TryFrom<Command> for ledger::Command {
  type Error = Error;

  /// Conversion from a deserializable record into a command that can be executed by the wallet.
  fn try_from(record: Command) -> Result<Self> {
    let account_id = record.account_id;
    match record.kind {
      CommandType::Open => Ok(ledger::Command::Open {
        account_id,
        owner: required(record.reference, "owner")?,
        phone: record.counterparty,
      }),
      CommandType::Pin => Ok(ledger::Command::SetPin {
        account_id,
        pin: required(record.pin, "pin")?,
      }),
      CommandType::Deposit => Ok(ledger::Command::Deposit {
        account_id,
        amount: record.amount.ok_or_else(|| anyhow!("missing amount"))?,
        pin: required(record.pin, "pin")?,
      }),
      CommandType::Withdrawal => Ok(ledger::Command::Withdrawal {
        account_id,
        amount: record.amount.ok_or_else(|| anyhow!("missing amount"))?,
        pin: required(record.pin, "pin")?,
      }),
      CommandType::Send => Ok(ledger::Command::Send {
        account_id,
        receiver_id: required(record.counterparty, "receiver")?
          .parse()
          .context("invalid receiver account")?,
        amount: record.amount.ok_or_else(|| anyhow!("missing amount"))?,
        pin: required(record.pin, "pin")?,
        description: record.reference.unwrap_or_default(),
      }),
      CommandType::Bill => Ok(ledger::Command::PayBill {
        account_id,
        bill_type: required(record.counterparty, "bill type")?.parse::<BillType>()?,
        bill_number: required(record.reference, "bill number")?,
        amount: record.amount.ok_or_else(|| anyhow!("missing amount"))?,
        pin: required(record.pin, "pin")?,
      }),
    }
  }
}

fn required(field: Option<String>, name: &str) -> Result<String> {
  field
    .filter(|value| !value.is_empty())
    .ok_or_else(|| anyhow!("missing {}", name))
}
