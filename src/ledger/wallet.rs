use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use super::{
  account::{Account, AccountId, AccountReport, AccountStore},
  bill::{Bill, BillReference, BillRegistry},
  command::Command,
  engine::{validate_amount, Authorization, CallerContext, LedgerEngine, TransferRequest},
  error::{LedgerError, Result},
  log::InMemoryTransactionLog,
  notify::NotificationSink,
  outcome::TransferOutcome,
  qr::QrPayload,
  requests::{
    MoneyRequest, MoneyRequestId, MoneyRequestWorkflow, RequestAction, MAX_REQUEST_AMOUNT,
  },
  transaction::{Transaction, TransactionId, TransactionType},
};
use crate::config::LedgerConfig;

const RECENT_TRANSACTIONS: usize = 5;

/// Interface implemented by the components able to replay [`Command`]s
#[async_trait]
pub trait CommandProcessor {
  /// Executes one command, returning the transaction it created, if any.
  async fn process(&self, command: Command) -> Result<Option<Transaction>>;
  /// Current state of every account.
  async fn accounts_report(&self) -> Result<Vec<AccountReport>>;
}

/// Monthly overview of an account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
  pub balance: Decimal,
  pub transactions_this_month: usize,
  pub money_sent: Decimal,
  pub money_received: Decimal,
  pub recent: Vec<Transaction>,
}

/// Caller facing operations of the wallet. Every operation acts on behalf of the account
/// in the [`CallerContext`].
pub struct Wallet {
  engine: Arc<LedgerEngine>,
  requests: MoneyRequestWorkflow,
  bills: BillRegistry,
}

impl Wallet {
  pub fn new(engine: Arc<LedgerEngine>) -> Self {
    Self {
      requests: MoneyRequestWorkflow::new(engine.clone()),
      bills: BillRegistry::default(),
      engine,
    }
  }

  /// A wallet keeping accounts and transactions in memory.
  pub fn in_memory(
    config: &LedgerConfig,
    notifications: Arc<dyn NotificationSink>,
  ) -> anyhow::Result<Self> {
    let accounts = Arc::new(AccountStore::new(config.locking.clone()));
    let log = Arc::new(InMemoryTransactionLog::new());
    let engine = LedgerEngine::new(config, accounts, log, notifications)?;
    Ok(Self::new(Arc::new(engine)))
  }

  pub fn engine(&self) -> &LedgerEngine {
    &self.engine
  }

  pub fn accounts(&self) -> &AccountStore {
    self.engine.accounts()
  }

  pub fn open_account(&self, account: Account) -> Result<()> {
    self.accounts().insert(account)
  }

  pub async fn balance(&self, ctx: &CallerContext) -> Result<Decimal> {
    self.accounts().get_balance(ctx.account).await
  }

  pub async fn set_initial_pin(&self, ctx: &CallerContext, pin: &str) -> Result<()> {
    self.engine.pins().set_initial_pin(ctx.account, pin).await
  }

  pub async fn change_pin(&self, ctx: &CallerContext, current: &str, new: &str) -> Result<()> {
    self.engine.pins().change_pin(ctx.account, current, new).await
  }

  /// Sends money to the account registered with `receiver_phone`.
  pub async fn send_money(
    &self,
    ctx: &CallerContext,
    receiver_phone: &str,
    amount: Decimal,
    description: &str,
    pin: &str,
  ) -> Result<Transaction> {
    let receiver = self
      .accounts()
      .find_by_phone(receiver_phone.trim())?
      .ok_or_else(|| LedgerError::CounterpartyNotFound(receiver_phone.to_string()))?;
    self
      .send_to_account(ctx, receiver, amount, description, pin)
      .await
  }

  pub async fn send_to_account(
    &self,
    ctx: &CallerContext,
    receiver: AccountId,
    amount: Decimal,
    description: &str,
    pin: &str,
  ) -> Result<Transaction> {
    self
      .engine
      .transfer(TransferRequest {
        sender: Some(ctx.account),
        receiver: Some(receiver),
        amount,
        authorization: Authorization::Pin(pin.to_string()),
        kind: TransactionType::Send,
        description: description.to_string(),
      })
      .await
  }

  /// Adds money from outside the system to the caller's account.
  pub async fn top_up(&self, ctx: &CallerContext, amount: Decimal, pin: &str) -> Result<Transaction> {
    if !self.engine.pins().verify(ctx.account, pin).await? {
      return Err(LedgerError::Authentication);
    }
    self
      .engine
      .transfer(TransferRequest {
        sender: None,
        receiver: Some(ctx.account),
        amount,
        authorization: Authorization::Preauthorized,
        kind: TransactionType::Deposit,
        description: "Account top-up".to_string(),
      })
      .await
  }

  /// Takes money out of the system from the caller's account.
  pub async fn withdraw(&self, ctx: &CallerContext, amount: Decimal, pin: &str) -> Result<Transaction> {
    self
      .engine
      .transfer(TransferRequest {
        sender: Some(ctx.account),
        receiver: None,
        amount,
        authorization: Authorization::Pin(pin.to_string()),
        kind: TransactionType::Withdrawal,
        description: "Withdrawal".to_string(),
      })
      .await
  }

  /// Pays an external bill and records it as paid.
  pub async fn pay_bill(
    &self,
    ctx: &CallerContext,
    reference: BillReference,
    amount: Decimal,
    pin: &str,
  ) -> Result<(Transaction, Bill)> {
    let transaction = self
      .engine
      .transfer(TransferRequest {
        sender: Some(ctx.account),
        receiver: None,
        amount,
        authorization: Authorization::Pin(pin.to_string()),
        kind: TransactionType::BillPayment,
        description: reference.description(),
      })
      .await?;
    let bill = self.bills.record_paid(ctx.account, reference, &transaction);
    Ok((transaction, bill))
  }

  pub fn bills(&self, ctx: &CallerContext) -> Result<Vec<Bill>> {
    self.bills.bills_of(ctx.account)
  }

  /// Builds the QR payload other accounts can scan to pay the caller.
  pub fn generate_qr(&self, ctx: &CallerContext, amount: Option<Decimal>) -> Result<String> {
    if !self.accounts().exists(ctx.account) {
      return Err(LedgerError::AccountNotFound(ctx.account));
    }
    if let Some(amount) = amount {
      validate_amount(amount, Decimal::from(MAX_REQUEST_AMOUNT))?;
    }
    QrPayload::new(ctx.account, amount).encode()
  }

  /// Pays the account and amount encoded in a scanned QR payload.
  pub async fn pay_qr(&self, ctx: &CallerContext, data: &str, pin: &str) -> Result<Transaction> {
    let payload = QrPayload::decode(data)?;
    let amount = payload.payable_amount()?;
    if !self.accounts().exists(payload.account_id) {
      return Err(LedgerError::CounterpartyNotFound(
        payload.account_id.to_string(),
      ));
    }
    self
      .engine
      .transfer(TransferRequest {
        sender: Some(ctx.account),
        receiver: Some(payload.account_id),
        amount,
        authorization: Authorization::Pin(pin.to_string()),
        kind: TransactionType::QrPayment,
        description: "QR Code Payment".to_string(),
      })
      .await
  }

  /// Asks the account registered with `target_phone` to send money to the caller.
  pub async fn request_money(
    &self,
    ctx: &CallerContext,
    target_phone: &str,
    amount: Decimal,
    message: &str,
  ) -> Result<MoneyRequest> {
    let target = self
      .accounts()
      .find_by_phone(target_phone.trim())?
      .ok_or_else(|| LedgerError::CounterpartyNotFound(target_phone.to_string()))?;
    self.requests.create(ctx, target, amount, message).await
  }

  pub async fn respond_to_request(
    &self,
    ctx: &CallerContext,
    id: MoneyRequestId,
    action: RequestAction,
  ) -> Result<MoneyRequest> {
    self.requests.respond(ctx, id, action).await
  }

  pub async fn pending_requests(&self, ctx: &CallerContext) -> Result<Vec<MoneyRequest>> {
    self.requests.pending_for(ctx).await
  }

  /// Transactions sent or received by the caller, newest first.
  pub async fn history(&self, ctx: &CallerContext) -> Result<Vec<Transaction>> {
    self.engine.log().history(ctx.account).await
  }

  /// A single transaction, visible only to its sender and receiver.
  pub async fn transaction_detail(
    &self,
    ctx: &CallerContext,
    id: &TransactionId,
  ) -> Result<Transaction> {
    let transaction = self
      .engine
      .log()
      .find_by_id(id)
      .await?
      .ok_or(LedgerError::TransactionNotFound(*id))?;
    if transaction.involves(ctx.account) {
      Ok(transaction)
    } else {
      Err(LedgerError::Forbidden)
    }
  }

  /// Activity of the caller since the beginning of the month of `now`.
  pub async fn monthly_summary(
    &self,
    ctx: &CallerContext,
    now: DateTime<Utc>,
  ) -> Result<AccountSummary> {
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
      .and_then(|date| date.and_hms_opt(0, 0, 0))
      .map(|start| Utc.from_utc_datetime(&start))
      .ok_or_else(|| LedgerError::validation("invalid reference date"))?;

    let balance = self.balance(ctx).await?;
    let history = self.history(ctx).await?;
    let this_month: Vec<&Transaction> = history
      .iter()
      .filter(|transaction| transaction.created_at >= month_start)
      .collect();

    Ok(AccountSummary {
      balance,
      transactions_this_month: this_month.len(),
      money_sent: this_month
        .iter()
        .filter(|transaction| transaction.sender == Some(ctx.account))
        .map(|transaction| transaction.amount)
        .sum(),
      money_received: this_month
        .iter()
        .filter(|transaction| transaction.receiver == Some(ctx.account))
        .map(|transaction| transaction.amount)
        .sum(),
      recent: history.iter().take(RECENT_TRANSACTIONS).cloned().collect(),
    })
  }

  /// Presentation result of an operation performed by the caller, naming the other party.
  pub async fn outcome(
    &self,
    ctx: &CallerContext,
    result: &Result<Transaction>,
    amount: Decimal,
  ) -> TransferOutcome {
    let counterparty_name = match result {
      Ok(transaction) => match transaction.counterparty_of(ctx.account) {
        Some(other) => self
          .accounts()
          .find_by_id(other)
          .await
          .ok()
          .flatten()
          .map(|account| account.owner),
        None => None,
      },
      Err(_) => None,
    };
    TransferOutcome::from_result(result, amount, counterparty_name)
  }
}

#[async_trait]
impl CommandProcessor for Wallet {
  async fn process(&self, command: Command) -> Result<Option<Transaction>> {
    match command {
      Command::Open {
        account_id,
        owner,
        phone,
      } => {
        let account = Account::new(account_id, owner);
        let account = match phone {
          Some(phone) => account.with_phone(phone),
          None => account,
        };
        self.open_account(account).map(|_| None)
      }
      Command::SetPin { account_id, pin } => self
        .set_initial_pin(&CallerContext::new(account_id), &pin)
        .await
        .map(|_| None),
      Command::Deposit {
        account_id,
        amount,
        pin,
      } => self
        .top_up(&CallerContext::new(account_id), amount, &pin)
        .await
        .map(Some),
      Command::Withdrawal {
        account_id,
        amount,
        pin,
      } => self
        .withdraw(&CallerContext::new(account_id), amount, &pin)
        .await
        .map(Some),
      Command::Send {
        account_id,
        receiver_id,
        amount,
        pin,
        description,
      } => self
        .send_to_account(
          &CallerContext::new(account_id),
          receiver_id,
          amount,
          &description,
          &pin,
        )
        .await
        .map(Some),
      Command::PayBill {
        account_id,
        bill_type,
        bill_number,
        amount,
        pin,
      } => {
        let reference = BillReference::new(bill_type, &bill_number)?;
        self
          .pay_bill(&CallerContext::new(account_id), reference, amount, &pin)
          .await
          .map(|(transaction, _)| Some(transaction))
      }
    }
  }

  async fn accounts_report(&self) -> Result<Vec<AccountReport>> {
    self.accounts().accounts_report().await
  }
}
