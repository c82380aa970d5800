use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{
  account::{Account, AccountGuard, AccountId, AccountStore},
  error::{LedgerError, Result},
  fraud::{FraudGuard, FraudVerdict},
  log::TransactionLog,
  notify::NotificationSink,
  pin::PinAuthenticator,
  transaction::{Transaction, TransactionType},
};
use crate::config::LedgerConfig;

/// Number of decimals stored for amounts
pub const AMOUNT_SCALE: u32 = 2;

/// Upper bound of a transaction amount, stored as decimal(12,2)
const MAX_TRANSACTION_AMOUNT: i64 = 10_000_000_000;

const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Upper bound of a single notification delivery
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Authenticated identity of the caller, resolved by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
  pub account: AccountId,
}

impl CallerContext {
  pub fn new(account: AccountId) -> Self {
    Self { account }
  }
}

/// How the sender authorizes an outgoing transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
  /// The transaction PIN submitted with the request.
  Pin(String),
  /// The transfer was authorized by other means (an accepted money request, or a PIN already verified).
  Preauthorized,
}

/// A fund movement to be executed by the [`LedgerEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
  pub sender: Option<AccountId>,
  pub receiver: Option<AccountId>,
  pub amount: Decimal,
  pub authorization: Authorization,
  pub kind: TransactionType,
  pub description: String,
}

/// Orchestrates transfers: authentication, fraud screening, and the atomic balance update
/// together with the transaction record.
pub struct LedgerEngine {
  accounts: Arc<AccountStore>,
  log: Arc<dyn TransactionLog>,
  pins: PinAuthenticator,
  fraud: FraudGuard,
  notifications: Arc<dyn NotificationSink>,
}

impl LedgerEngine {
  pub fn new(
    config: &LedgerConfig,
    accounts: Arc<AccountStore>,
    log: Arc<dyn TransactionLog>,
    notifications: Arc<dyn NotificationSink>,
  ) -> anyhow::Result<Self> {
    Ok(Self {
      pins: PinAuthenticator::new(accounts.clone(), &config.pin)?,
      fraud: FraudGuard::new(log.clone(), config.fraud.clone()),
      accounts,
      log,
      notifications,
    })
  }

  pub fn accounts(&self) -> &AccountStore {
    &self.accounts
  }

  pub fn log(&self) -> &dyn TransactionLog {
    self.log.as_ref()
  }

  pub fn pins(&self) -> &PinAuthenticator {
    &self.pins
  }

  /// Moves `amount` from the sender to the receiver and records a completed [`Transaction`].
  ///
  /// Validation, authentication, fraud screening and lock acquisition happen before any mutation.
  /// The debit, the credit and the record insertion either all land or none of them do.
  pub async fn transfer(&self, request: TransferRequest) -> Result<Transaction> {
    let result = self.execute(&request).await;
    match &result {
      Ok(transaction) => info!(
        transaction = %transaction.id,
        kind = %transaction.kind,
        amount = %transaction.amount,
        sender = ?transaction.sender,
        receiver = ?transaction.receiver,
        "transfer committed"
      ),
      Err(err) => info!(
        kind = %request.kind,
        amount = %request.amount,
        sender = ?request.sender,
        receiver = ?request.receiver,
        error = %err,
        "transfer rejected"
      ),
    }
    result
  }

  async fn execute(&self, request: &TransferRequest) -> Result<Transaction> {
    validate_transfer(request)?;
    let amount = request.amount;

    if let Some(receiver) = request.receiver {
      if !self.accounts.exists(receiver) {
        return Err(LedgerError::CounterpartyNotFound(receiver.to_string()));
      }
    }

    if let Some(sender) = request.sender {
      if !self.accounts.exists(sender) {
        return Err(LedgerError::AccountNotFound(sender));
      }
      if let Authorization::Pin(pin) = &request.authorization {
        if !self.pins.verify(sender, pin).await? {
          return Err(LedgerError::Authentication);
        }
      }
      if let FraudVerdict::Flagged(reason) = self.fraud.evaluate(sender, amount).await? {
        return Err(LedgerError::FraudBlocked(reason));
      }
    }

    let (mut sender, mut receiver) = self.lock_parties(request.sender, request.receiver).await?;
    let before = (sender.as_deref().cloned(), receiver.as_deref().cloned());

    let transaction = Transaction::completed(
      request.sender,
      request.receiver,
      request.kind,
      amount,
      request.description.clone(),
      Utc::now(),
    );

    let committed = match apply(sender.as_deref_mut(), receiver.as_deref_mut(), amount) {
      Ok(()) => self.log.insert(transaction.clone()).await,
      Err(err) => Err(err),
    };

    if let Err(err) = committed {
      restore(sender.as_deref_mut(), before.0);
      restore(receiver.as_deref_mut(), before.1);
      if let LedgerError::Persistence(reason) = &err {
        warn!(transaction = %transaction.id, %reason, "transfer rolled back");
      }
      return Err(err);
    }

    let sender_name = sender.as_deref().map(|account| account.owner.clone());
    let receiver_name = receiver.as_deref().map(|account| account.owner.clone());
    drop(sender);
    drop(receiver);

    for (account, title, body) in notices(&transaction, sender_name, receiver_name) {
      self.notify(account, title, body);
    }

    Ok(transaction)
  }

  /// Best-effort delivery of a notification on a detached task. The caller never waits for the sink,
  /// failures and deliveries slower than [`NOTIFICATION_TIMEOUT`] are logged and dropped.
  pub(crate) fn notify(&self, account: AccountId, title: &str, body: String) {
    let sink = self.notifications.clone();
    let title = title.to_string();
    tokio::spawn(async move {
      match tokio::time::timeout(NOTIFICATION_TIMEOUT, sink.notify(account, &title, &body)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(account, %title, error = %err, "notification dispatch failed"),
        Err(_) => warn!(account, %title, "notification dispatch timed out"),
      }
    });
  }

  async fn lock_parties(
    &self,
    sender: Option<AccountId>,
    receiver: Option<AccountId>,
  ) -> Result<(Option<AccountGuard>, Option<AccountGuard>)> {
    match (sender, receiver) {
      (Some(sender), Some(receiver)) => {
        let (sender, receiver) = self.accounts.lock_pair(sender, receiver).await?;
        Ok((Some(sender), Some(receiver)))
      }
      (Some(sender), None) => Ok((Some(self.accounts.lock(sender).await?), None)),
      (None, Some(receiver)) => Ok((None, Some(self.accounts.lock(receiver).await?))),
      (None, None) => Err(LedgerError::validation(
        "a transfer needs a sender or a receiver",
      )),
    }
  }
}

/// Checks the parts of a request that do not depend on ledger state.
fn validate_transfer(request: &TransferRequest) -> Result<()> {
  validate_amount(request.amount, Decimal::from(MAX_TRANSACTION_AMOUNT))?;

  match (request.sender, request.receiver) {
    (None, None) => Err(LedgerError::validation(
      "a transfer needs a sender or a receiver",
    )),
    (Some(sender), Some(receiver)) if sender == receiver => Err(LedgerError::validation(
      "sender and receiver must be different accounts",
    )),
    _ if request.description.chars().count() > MAX_DESCRIPTION_LENGTH => Err(
      LedgerError::validation("description is longer than 200 characters"),
    ),
    _ => Ok(()),
  }
}

/// An amount must be strictly positive, below `limit`, and have at most [`AMOUNT_SCALE`] decimals.
pub(crate) fn validate_amount(amount: Decimal, limit: Decimal) -> Result<()> {
  if amount <= Decimal::ZERO {
    Err(LedgerError::validation("amount must be greater than zero"))
  } else if amount.normalize().scale() > AMOUNT_SCALE {
    Err(LedgerError::validation(
      "amount cannot have more than 2 decimals",
    ))
  } else if amount >= limit {
    Err(LedgerError::validation("amount is too large"))
  } else {
    Ok(())
  }
}

fn apply(sender: Option<&mut Account>, receiver: Option<&mut Account>, amount: Decimal) -> Result<()> {
  if let Some(account) = &sender {
    account.ensure_active()?;
  }
  if let Some(account) = &receiver {
    account.ensure_active()?;
  }
  if let Some(account) = sender {
    account.debit(amount)?;
  }
  if let Some(account) = receiver {
    account.credit(amount)?;
  }
  Ok(())
}

fn restore(guard: Option<&mut Account>, snapshot: Option<Account>) {
  if let (Some(account), Some(snapshot)) = (guard, snapshot) {
    debug!(account = account.id, "restoring account state");
    *account = snapshot;
  }
}

fn notices(
  transaction: &Transaction,
  sender_name: Option<String>,
  receiver_name: Option<String>,
) -> Vec<(AccountId, &'static str, String)> {
  let amount = transaction.amount.round_dp(AMOUNT_SCALE);
  match (transaction.sender, transaction.receiver) {
    (Some(_), Some(receiver)) => vec![(
      receiver,
      "Money Received",
      format!(
        "You received {} from {}",
        amount,
        sender_name.unwrap_or_default()
      ),
    )],
    (Some(sender), None) if transaction.kind == TransactionType::BillPayment => vec![(
      sender,
      "Bill Paid",
      format!("{} ({})", transaction.description, amount),
    )],
    (Some(sender), None) => vec![(
      sender,
      "Withdrawal Completed",
      format!("{} was withdrawn from your account", amount),
    )],
    (None, Some(receiver)) => vec![(
      receiver,
      "Top-up Successful",
      format!(
        "{} was added to the account of {}",
        amount,
        receiver_name.unwrap_or_default()
      ),
    )],
    (None, None) => vec![],
  }
}


#[cfg(test)]
mod tests {

  use async_trait::async_trait;
  use chrono::{DateTime, Duration};
  use rust_decimal_macros::dec;

  use super::testing::*;
  use super::*;
  use crate::ledger::{
    fraud::FraudReason,
    notify::testing::{RecordingSink, StalledSink},
    transaction::{TransactionId, TransactionStatus},
  };

  async fn balance(fixture: &Fixture, account: AccountId) -> Decimal {
    fixture.accounts.get_balance(account).await.unwrap()
  }

  #[tokio::test]
  async fn peer_transfer_successfully() {
    let fixture = fixture(vec![(1, "Alice", dec!(1000)), (2, "Bob", dec!(200))]).await;

    let transaction = fixture.engine.transfer(send(1, 2, dec!(400))).await.unwrap();

    assert_eq!(balance(&fixture, 1).await, dec!(600));
    assert_eq!(balance(&fixture, 2).await, dec!(600));
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert_eq!(transaction.kind, TransactionType::Send);
    assert_eq!(transaction.sender, Some(1));
    assert_eq!(transaction.receiver, Some(2));
    assert!(transaction.completed_at.is_some());
    assert_eq!(fixture.log.len(), 1);
    assert_eq!(
      fixture.log.find_by_id(&transaction.id).await.unwrap(),
      Some(transaction)
    );
    assert_eq!(
      fixture.sink.wait_for_titles(2, 1).await,
      vec!["Money Received".to_string()]
    );
  }

  #[tokio::test]
  async fn insufficient_funds_has_no_effect() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;

    let result = fixture.engine.transfer(send(1, 2, dec!(400))).await;

    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(balance(&fixture, 1).await, dec!(100));
    assert_eq!(balance(&fixture, 2).await, dec!(0));
    assert!(fixture.log.is_empty());
    assert!(fixture.sink.titles_for(2).is_empty());
  }

  #[tokio::test]
  async fn invalid_amounts_are_rejected() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;

    for amount in vec![dec!(0), dec!(-5), dec!(1.005), dec!(10000000000)] {
      let result = fixture.engine.transfer(send(1, 2, amount)).await;
      assert!(
        matches!(result, Err(LedgerError::Validation(_))),
        "amount {}",
        amount
      );
    }
    assert!(fixture.log.is_empty());
  }

  #[tokio::test]
  async fn trailing_zero_decimals_are_accepted() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;

    let result = fixture.engine.transfer(send(1, 2, dec!(10.500))).await;

    assert!(result.is_ok());
    assert_eq!(balance(&fixture, 2).await, dec!(10.5));
  }

  #[tokio::test]
  async fn transfer_to_self_is_rejected() {
    let fixture = fixture(vec![(1, "Alice", dec!(100))]).await;

    let result = fixture.engine.transfer(send(1, 1, dec!(10))).await;

    assert!(matches!(result, Err(LedgerError::Validation(_))));
  }

  #[tokio::test]
  async fn long_description_is_rejected() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;
    let request = TransferRequest {
      description: "x".repeat(201),
      ..send(1, 2, dec!(10))
    };

    let result = fixture.engine.transfer(request).await;

    assert!(matches!(result, Err(LedgerError::Validation(_))));
  }

  #[tokio::test]
  async fn wrong_pin_is_rejected() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;
    let request = TransferRequest {
      authorization: Authorization::Pin("9876".to_string()),
      ..send(1, 2, dec!(10))
    };

    let result = fixture.engine.transfer(request).await;

    assert_eq!(result, Err(LedgerError::Authentication));
    assert_eq!(balance(&fixture, 1).await, dec!(100));
    assert!(fixture.log.is_empty());
  }

  #[tokio::test]
  async fn sender_without_pin_cannot_send() {
    let fixture = fixture(vec![(2, "Bob", dec!(0))]).await;
    fixture
      .accounts
      .insert(Account::new(3, "Carol").with_balance(dec!(50)))
      .unwrap();

    let result = fixture.engine.transfer(send(3, 2, dec!(10))).await;

    assert_eq!(result, Err(LedgerError::Authentication));
  }

  #[tokio::test]
  async fn unknown_parties() {
    let fixture = fixture(vec![(1, "Alice", dec!(100))]).await;

    assert_eq!(
      fixture.engine.transfer(send(1, 9, dec!(10))).await,
      Err(LedgerError::CounterpartyNotFound("9".to_string()))
    );
    assert_eq!(
      fixture.engine.transfer(send(8, 1, dec!(10))).await,
      Err(LedgerError::AccountNotFound(8))
    );
  }

  #[tokio::test]
  async fn fraud_large_single_blocks_transfer() {
    let fixture = fixture(vec![(1, "Alice", dec!(500000)), (2, "Bob", dec!(0))]).await;

    let result = fixture.engine.transfer(send(1, 2, dec!(150000))).await;

    assert_eq!(
      result,
      Err(LedgerError::FraudBlocked(FraudReason::LargeSingle))
    );
    assert_eq!(balance(&fixture, 1).await, dec!(500000));
    assert!(fixture.log.is_empty());
  }

  #[tokio::test]
  async fn fraud_velocity_blocks_second_transfer() {
    let fixture = fixture(vec![(1, "Alice", dec!(100000)), (2, "Bob", dec!(0))]).await;

    fixture.engine.transfer(send(1, 2, dec!(30000))).await.unwrap();
    let result = fixture.engine.transfer(send(1, 2, dec!(30000))).await;

    assert_eq!(result, Err(LedgerError::FraudBlocked(FraudReason::Velocity)));
    assert_eq!(balance(&fixture, 1).await, dec!(70000));
    assert_eq!(balance(&fixture, 2).await, dec!(30000));
    assert_eq!(fixture.log.len(), 1);
  }

  #[tokio::test]
  async fn blocked_accounts_cannot_move_funds() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(100))]).await;
    fixture.accounts.set_blocked(2, true).await.unwrap();

    assert_eq!(
      fixture.engine.transfer(send(1, 2, dec!(10))).await,
      Err(LedgerError::AccountBlocked(2))
    );
    assert_eq!(
      fixture.engine.transfer(send(2, 1, dec!(10))).await,
      Err(LedgerError::AccountBlocked(2))
    );
    assert_eq!(balance(&fixture, 1).await, dec!(100));
    assert_eq!(balance(&fixture, 2).await, dec!(100));
  }

  #[tokio::test]
  async fn deposit_mints_into_receiver() {
    let fixture = fixture(vec![(1, "Alice", dec!(100))]).await;
    let request = TransferRequest {
      sender: None,
      receiver: Some(1),
      amount: dec!(250),
      authorization: Authorization::Preauthorized,
      kind: TransactionType::Deposit,
      description: "Account top-up".to_string(),
    };

    let transaction = fixture.engine.transfer(request).await.unwrap();

    assert_eq!(balance(&fixture, 1).await, dec!(350));
    assert_eq!(transaction.sender, None);
    assert_eq!(transaction.receiver, Some(1));
    assert_eq!(
      fixture.sink.wait_for_titles(1, 1).await,
      vec!["Top-up Successful".to_string()]
    );
  }

  #[tokio::test]
  async fn withdrawal_burns_from_sender() {
    let fixture = fixture(vec![(1, "Alice", dec!(100))]).await;
    let request = TransferRequest {
      receiver: None,
      kind: TransactionType::Withdrawal,
      ..send(1, 0, dec!(40))
    };

    let transaction = fixture.engine.transfer(request).await.unwrap();

    assert_eq!(balance(&fixture, 1).await, dec!(60));
    assert_eq!(transaction.receiver, None);
    assert_eq!(transaction.kind, TransactionType::Withdrawal);
  }

  #[tokio::test]
  async fn transfer_without_parties_is_rejected() {
    let fixture = fixture(vec![]).await;
    let request = TransferRequest {
      sender: None,
      receiver: None,
      ..send(1, 2, dec!(10))
    };

    assert!(matches!(
      fixture.engine.transfer(request).await,
      Err(LedgerError::Validation(_))
    ));
  }

  #[tokio::test]
  async fn notification_failure_does_not_fail_transfer() {
    let fixture = fixture_with(
      test_config(),
      RecordingSink::failing(),
      vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))],
    )
    .await;

    let result = fixture.engine.transfer(send(1, 2, dec!(10))).await;

    assert!(result.is_ok());
    assert_eq!(balance(&fixture, 2).await, dec!(10));
    assert_eq!(
      fixture.sink.wait_for_titles(2, 1).await,
      vec!["Money Received".to_string()]
    );
  }

  #[tokio::test]
  async fn busy_account_surfaces_concurrency_conflict() {
    let fixture = fixture(vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))]).await;

    let held = fixture.accounts.lock(2).await.unwrap();
    let result = fixture.engine.transfer(send(1, 2, dec!(10))).await;
    drop(held);

    assert_eq!(result, Err(LedgerError::ConcurrencyConflict(2)));
    assert_eq!(balance(&fixture, 1).await, dec!(100));
    assert!(fixture.log.is_empty());
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn opposite_transfers_do_not_lose_updates() {
    let fixture = fixture(vec![(1, "A", dec!(1000)), (2, "B", dec!(1000))]).await;

    let (a_to_b, b_to_a) = tokio::join!(
      tokio::spawn({
        let engine = fixture.engine.clone();
        async move { engine.transfer(send(1, 2, dec!(300))).await }
      }),
      tokio::spawn({
        let engine = fixture.engine.clone();
        async move { engine.transfer(send(2, 1, dec!(300))).await }
      })
    );

    assert!(a_to_b.unwrap().is_ok());
    assert!(b_to_a.unwrap().is_ok());
    assert_eq!(balance(&fixture, 1).await, dec!(1000));
    assert_eq!(balance(&fixture, 2).await, dec!(1000));
    let completed = fixture
      .log
      .history(1)
      .await
      .unwrap()
      .into_iter()
      .filter(|transaction| transaction.status == TransactionStatus::Completed)
      .count();
    assert_eq!(completed, 2);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_transfers_conserve_funds() {
    let fixture = fixture(vec![
      (1, "A", dec!(100)),
      (2, "B", dec!(100)),
      (3, "C", dec!(100)),
    ])
    .await;

    let handles: Vec<_> = (0..60u64)
      .map(|i| {
        let engine = fixture.engine.clone();
        let sender = i % 3 + 1;
        let receiver = (i + 1) % 3 + 1;
        tokio::spawn(async move {
          let request = TransferRequest {
            authorization: Authorization::Preauthorized,
            ..send(sender, receiver, dec!(7.25))
          };
          engine.transfer(request).await
        })
      })
      .collect();
    let results: Vec<_> = futures::future::join_all(handles)
      .await
      .into_iter()
      .map(|handle| handle.unwrap())
      .collect();

    let succeeded = results.iter().filter(|result| result.is_ok()).count();
    assert!(results
      .iter()
      .all(|result| result.is_ok() || result == &Err(LedgerError::InsufficientFunds)));

    let mut total = Decimal::ZERO;
    for account in 1..=3 {
      let balance = balance(&fixture, account).await;
      assert!(balance >= Decimal::ZERO);
      total += balance;
    }
    assert_eq!(total, dec!(300));
    assert_eq!(fixture.log.len(), succeeded);
  }

  mockall::mock! {
    FailingLog {}
    #[async_trait]
    impl TransactionLog for FailingLog {
      async fn insert(&self, transaction: Transaction) -> Result<()>;
      async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>>;
      async fn history(&self, account: AccountId) -> Result<Vec<Transaction>>;
      async fn outgoing_completed_since(
        &self,
        account: AccountId,
        since: DateTime<Utc>,
      ) -> Result<Decimal>;
    }
  }

  #[tokio::test]
  async fn stalled_notification_sink_does_not_delay_transfer() {
    let (engine, accounts) = engine_with_sink(
      Arc::new(StalledSink),
      vec![(1, "Alice", dec!(100)), (2, "Bob", dec!(0))],
    )
    .await;

    let result = tokio::time::timeout(
      std::time::Duration::from_secs(1),
      engine.transfer(send(1, 2, dec!(10))),
    )
    .await;

    assert!(matches!(result, Ok(Ok(_))));
    assert_eq!(accounts.get_balance(1).await.unwrap(), dec!(90));
    assert_eq!(accounts.get_balance(2).await.unwrap(), dec!(10));
  }

  #[tokio::test]
  async fn persistence_failure_rolls_back_balances() {
    let mut log = MockFailingLog::new();
    log
      .expect_outgoing_completed_since()
      .returning(|_, _| Ok(Decimal::ZERO));
    log
      .expect_insert()
      .times(1)
      .returning(|_| Err(LedgerError::Persistence("disk full".to_string())));

    let config = test_config();
    let accounts = Arc::new(AccountStore::new(config.locking.clone()));
    let sink = Arc::new(RecordingSink::default());
    let engine =
      LedgerEngine::new(&config, accounts.clone(), Arc::new(log), sink.clone()).unwrap();
    accounts
      .insert(Account::new(1, "Alice").with_balance(dec!(100)))
      .unwrap();
    accounts.insert(Account::new(2, "Bob")).unwrap();
    engine.pins().set_initial_pin(1, PIN).await.unwrap();
    let before = accounts.find_by_id(1).await.unwrap().unwrap();

    let result = engine.transfer(send(1, 2, dec!(40))).await;

    assert_eq!(
      result,
      Err(LedgerError::Persistence("disk full".to_string()))
    );
    assert_eq!(accounts.find_by_id(1).await.unwrap().unwrap(), before);
    assert_eq!(accounts.get_balance(2).await.unwrap(), dec!(0));
    assert!(sink.titles_for(2).is_empty());
  }

  #[tokio::test]
  async fn velocity_window_uses_configuration() {
    let mut config = test_config();
    config.fraud.velocity_window_minutes = 1;
    let fixture = fixture_with(
      config,
      RecordingSink::default(),
      vec![(1, "Alice", dec!(100000)), (2, "Bob", dec!(0))],
    )
    .await;
    fixture
      .log
      .insert(Transaction::completed(
        Some(1),
        Some(2),
        TransactionType::Send,
        dec!(45000),
        String::new(),
        Utc::now() - Duration::minutes(5),
      ))
      .await
      .unwrap();

    assert!(fixture.engine.transfer(send(1, 2, dec!(10000))).await.is_ok());
  }
}
