use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
  account::AccountId,
  error::{LedgerError, Result},
};

/// Content of a payment QR code: `{"account_id": 7, "amount": 250.5}`.
///
/// The amount is optional when the code is generated, but a payment needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
  pub account_id: AccountId,
  #[serde(default, with = "json_amount")]
  pub amount: Option<Decimal>,
}

/// Amounts travel as plain JSON numbers, read back through their decimal text so `19.99` stays exact.
mod json_amount {
  use std::str::FromStr;

  use rust_decimal::prelude::ToPrimitive;
  use rust_decimal::Decimal;
  use serde::{de, ser, Deserialize, Deserializer, Serializer};
  use serde_json::Number;

  pub fn serialize<S: Serializer>(amount: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
    match amount {
      Some(amount) => {
        let value = amount
          .to_f64()
          .ok_or_else(|| {
            <S::Error as ser::Error>::custom(format!("amount {} is not representable", amount))
          })?;
        serializer.serialize_f64(value)
      }
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    match Option::<Number>::deserialize(deserializer)? {
      Some(number) => {
        let text = number.to_string();
        Decimal::from_str(&text)
          .or_else(|_| Decimal::from_scientific(&text))
          .map(Some)
          .map_err(|err| de::Error::custom(format!("invalid amount {}: {}", text, err)))
      }
      None => Ok(None),
    }
  }
}

impl QrPayload {
  pub fn new(account_id: AccountId, amount: Option<Decimal>) -> Self {
    Self { account_id, amount }
  }

  pub fn encode(&self) -> Result<String> {
    serde_json::to_string(self)
      .map_err(|err| LedgerError::Validation(format!("cannot encode QR payload: {}", err)))
  }

  pub fn decode(data: &str) -> Result<Self> {
    serde_json::from_str(data.trim())
      .map_err(|err| LedgerError::Validation(format!("invalid QR code: {}", err)))
  }

  /// The amount to pay, which must be present and strictly positive.
  pub fn payable_amount(&self) -> Result<Decimal> {
    match self.amount {
      Some(amount) if amount > Decimal::ZERO => Ok(amount),
      _ => Err(LedgerError::validation("invalid amount in QR code")),
    }
  }
}
