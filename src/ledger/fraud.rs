use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::{account::AccountId, error::Result, log::TransactionLog};
use crate::config::FraudConfig;

/// Why a transfer was considered suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudReason {
  /// Too much money left the account within the trailing window.
  Velocity,
  /// The amount alone is above the single transfer limit.
  LargeSingle,
}

impl fmt::Display for FraudReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FraudReason::Velocity => f.write_str("velocity"),
      FraudReason::LargeSingle => f.write_str("large_single"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudVerdict {
  Clear,
  Flagged(FraudReason),
}

impl FraudVerdict {
  pub fn is_flagged(&self) -> bool {
    matches!(self, FraudVerdict::Flagged(_))
  }
}

/// Read-only heuristic screening outgoing transfers before any mutation happens.
pub struct FraudGuard {
  log: Arc<dyn TransactionLog>,
  config: FraudConfig,
}

impl FraudGuard {
  pub fn new(log: Arc<dyn TransactionLog>, config: FraudConfig) -> Self {
    Self { log, config }
  }

  /// Evaluates a candidate outgoing transfer of `amount` from `account`.
  ///
  /// The single transaction limit is checked before the velocity rule, so an oversized first
  /// transfer is reported as [`FraudReason::LargeSingle`].
  pub async fn evaluate(&self, account: AccountId, amount: Decimal) -> Result<FraudVerdict> {
    if amount > self.config.large_single_threshold {
      info!(account, %amount, "transfer flagged: large single amount");
      return Ok(FraudVerdict::Flagged(FraudReason::LargeSingle));
    }

    let since = Utc::now() - Duration::minutes(self.config.velocity_window_minutes);
    let recent = self.log.outgoing_completed_since(account, since).await?;
    if recent + amount > self.config.velocity_threshold {
      info!(account, %amount, %recent, "transfer flagged: velocity");
      return Ok(FraudVerdict::Flagged(FraudReason::Velocity));
    }

    Ok(FraudVerdict::Clear)
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;
  use crate::ledger::{
    log::InMemoryTransactionLog,
    transaction::{Transaction, TransactionStatus, TransactionType},
  };

  fn outgoing(sender: AccountId, amount: Decimal, minutes_ago: i64) -> Transaction {
    Transaction::completed(
      Some(sender),
      Some(99),
      TransactionType::Send,
      amount,
      String::new(),
      Utc::now() - Duration::minutes(minutes_ago),
    )
  }

  async fn guard_with(transactions: Vec<Transaction>) -> FraudGuard {
    let log = Arc::new(InMemoryTransactionLog::new());
    for transaction in transactions {
      log.insert(transaction).await.unwrap();
    }
    FraudGuard::new(log, FraudConfig::default())
  }

  #[tokio::test]
  async fn small_transfer_without_history_is_clear() {
    let guard = guard_with(vec![]).await;

    assert_eq!(guard.evaluate(1, dec!(10000)).await, Ok(FraudVerdict::Clear));
  }

  #[tokio::test]
  async fn large_single_transfer_is_flagged() {
    let guard = guard_with(vec![]).await;

    assert_eq!(
      guard.evaluate(1, dec!(150000)).await,
      Ok(FraudVerdict::Flagged(FraudReason::LargeSingle))
    );
  }

  #[tokio::test]
  async fn second_transfer_within_the_hour_is_flagged_velocity() {
    let guard = guard_with(vec![outgoing(1, dec!(30000), 10)]).await;

    assert_eq!(
      guard.evaluate(1, dec!(30000)).await,
      Ok(FraudVerdict::Flagged(FraudReason::Velocity))
    );
  }

  #[tokio::test]
  async fn threshold_must_be_exceeded() {
    let guard = guard_with(vec![outgoing(1, dec!(30000), 10)]).await;

    assert_eq!(guard.evaluate(1, dec!(20000)).await, Ok(FraudVerdict::Clear));
    assert_eq!(guard.evaluate(1, dec!(100000)).await.map(|v| v.is_flagged()), Ok(true));
  }

  #[tokio::test]
  async fn velocity_ignores_old_foreign_and_incoming_transfers() {
    let mut failed = outgoing(1, dec!(40000), 5);
    failed.status = TransactionStatus::Failed;
    failed.completed_at = None;

    let guard = guard_with(vec![
      outgoing(1, dec!(40000), 90),
      outgoing(2, dec!(40000), 5),
      Transaction::completed(
        Some(3),
        Some(1),
        TransactionType::Send,
        dec!(40000),
        String::new(),
        Utc::now(),
      ),
      failed,
    ])
    .await;

    assert_eq!(guard.evaluate(1, dec!(30000)).await, Ok(FraudVerdict::Clear));
  }

  #[tokio::test]
  async fn thresholds_come_from_configuration() {
    let log = Arc::new(InMemoryTransactionLog::new());
    let guard = FraudGuard::new(
      log,
      FraudConfig {
        velocity_threshold: dec!(500),
        velocity_window_minutes: 60,
        large_single_threshold: dec!(1000),
      },
    );

    assert_eq!(
      guard.evaluate(1, dec!(600)).await,
      Ok(FraudVerdict::Flagged(FraudReason::Velocity))
    );
    assert_eq!(
      guard.evaluate(1, dec!(1001)).await,
      Ok(FraudVerdict::Flagged(FraudReason::LargeSingle))
    );
  }
}
