use rust_decimal::Decimal;

use super::{account::AccountId, bill::BillType};

/// Operations that can be replayed against a wallet, one per input record.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Open {
    account_id: AccountId,
    owner: String,
    phone: Option<String>,
  },
  SetPin {
    account_id: AccountId,
    pin: String,
  },
  Deposit {
    account_id: AccountId,
    amount: Decimal,
    pin: String,
  },
  Withdrawal {
    account_id: AccountId,
    amount: Decimal,
    pin: String,
  },
  Send {
    account_id: AccountId,
    receiver_id: AccountId,
    amount: Decimal,
    pin: String,
    description: String,
  },
  PayBill {
    account_id: AccountId,
    bill_type: BillType,
    bill_number: String,
    amount: Decimal,
    pin: String,
  },
}

impl Command {
  pub fn account_id(&self) -> AccountId {
    match self {
      Command::Open { account_id, .. }
      | Command::SetPin { account_id, .. }
      | Command::Deposit { account_id, .. }
      | Command::Withdrawal { account_id, .. }
      | Command::Send { account_id, .. }
      | Command::PayBill { account_id, .. } => *account_id,
    }
  }

  /// The amount moved by the command, zero for commands that move no funds.
  pub fn amount(&self) -> Decimal {
    match self {
      Command::Deposit { amount, .. }
      | Command::Withdrawal { amount, .. }
      | Command::Send { amount, .. }
      | Command::PayBill { amount, .. } => *amount,
      Command::Open { .. } | Command::SetPin { .. } => Decimal::ZERO,
    }
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn command_accessors() {
    let send = Command::Send {
      account_id: 1,
      receiver_id: 2,
      amount: dec!(10),
      pin: "2580".to_string(),
      description: String::new(),
    };
    let open = Command::Open {
      account_id: 3,
      owner: "Carol".to_string(),
      phone: None,
    };

    assert_eq!(send.account_id(), 1);
    assert_eq!(send.amount(), dec!(10));
    assert_eq!(open.account_id(), 3);
    assert_eq!(open.amount(), dec!(0));
  }
}
