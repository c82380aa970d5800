use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::{
  account::AccountId,
  engine::{validate_amount, Authorization, CallerContext, LedgerEngine, TransferRequest, AMOUNT_SCALE},
  error::{LedgerError, Result},
  transaction::{TransactionId, TransactionType},
};

/// Alias for a money request ID
pub type MoneyRequestId = u64;

/// Upper bound of a requested amount, stored as decimal(10,2)
pub(crate) const MAX_REQUEST_AMOUNT: i64 = 100_000_000;

const MAX_MESSAGE_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyRequestStatus {
  Pending,
  Accepted,
  Declined,
}

/// The answer of the target of a money request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
  Accept,
  Decline,
}

/// A pull payment: `requester` asks `target` to send `amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyRequest {
  pub id: MoneyRequestId,
  pub requester: AccountId,
  pub target: AccountId,
  pub amount: Decimal,
  pub message: String,
  pub status: MoneyRequestStatus,
  pub created_at: DateTime<Utc>,
  pub responded_at: Option<DateTime<Utc>>,
  pub transaction_id: Option<TransactionId>,
}

/// State machine of money requests on top of the [`LedgerEngine`].
///
/// `Pending` moves once to `Accepted` (exactly one transaction created) or `Declined` (none).
/// Responses to the same request are serialized by a per-request lock.
pub struct MoneyRequestWorkflow {
  engine: Arc<LedgerEngine>,
  requests: RwLock<HashMap<MoneyRequestId, Arc<Mutex<MoneyRequest>>>>,
  next_id: AtomicU64,
}

impl MoneyRequestWorkflow {
  pub fn new(engine: Arc<LedgerEngine>) -> Self {
    Self {
      engine,
      requests: RwLock::default(),
      next_id: AtomicU64::new(1),
    }
  }

  /// Creates a pending request from the caller to `target` and lets the target know about it.
  pub async fn create(
    &self,
    ctx: &CallerContext,
    target: AccountId,
    amount: Decimal,
    message: &str,
  ) -> Result<MoneyRequest> {
    validate_amount(amount, Decimal::from(MAX_REQUEST_AMOUNT))?;
    if message.chars().count() > MAX_MESSAGE_LENGTH {
      return Err(LedgerError::validation(
        "message is longer than 200 characters",
      ));
    }
    if target == ctx.account {
      return Err(LedgerError::validation("cannot request money from yourself"));
    }
    let requester = self
      .engine
      .accounts()
      .find_by_id(ctx.account)
      .await?
      .ok_or(LedgerError::AccountNotFound(ctx.account))?;
    if !self.engine.accounts().exists(target) {
      return Err(LedgerError::CounterpartyNotFound(target.to_string()));
    }

    let request = MoneyRequest {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      requester: ctx.account,
      target,
      amount,
      message: message.to_string(),
      status: MoneyRequestStatus::Pending,
      created_at: Utc::now(),
      responded_at: None,
      transaction_id: None,
    };
    self
      .requests
      .write()
      .map_err(poisoned)?
      .insert(request.id, Arc::new(Mutex::new(request.clone())));
    info!(request = request.id, requester = request.requester, target, %amount, "money request created");

    self
      .engine
      .notify(
        target,
        "Money Request",
        format!(
          "{} requested {}",
          requester.owner,
          amount.round_dp(AMOUNT_SCALE)
        ),
      );

    Ok(request)
  }

  /// Resolves a pending request. Only its target may respond.
  ///
  /// Accepting moves the funds without a PIN step; if it fails (for instance with
  /// [`LedgerError::InsufficientFunds`]) the request stays pending and can be accepted later.
  pub async fn respond(
    &self,
    ctx: &CallerContext,
    id: MoneyRequestId,
    action: RequestAction,
  ) -> Result<MoneyRequest> {
    let entry = self.entry(id)?;
    let mut request = entry.lock().await;

    if request.target != ctx.account {
      return Err(LedgerError::MoneyRequestNotFound(id));
    }
    if request.status != MoneyRequestStatus::Pending {
      return Err(LedgerError::InvalidState(format!(
        "money request {} is already {:?}",
        id, request.status
      )));
    }

    match action {
      RequestAction::Decline => {
        request.status = MoneyRequestStatus::Declined;
        request.responded_at = Some(Utc::now());
        info!(request = id, "money request declined");
      }
      RequestAction::Accept => {
        let transaction = self
          .engine
          .transfer(TransferRequest {
            sender: Some(request.target),
            receiver: Some(request.requester),
            amount: request.amount,
            authorization: Authorization::Preauthorized,
            kind: TransactionType::Send,
            description: format!("Money request payment: {}", request.message),
          })
          .await?;
        request.status = MoneyRequestStatus::Accepted;
        request.responded_at = transaction.completed_at;
        request.transaction_id = Some(transaction.id);
        info!(request = id, transaction = %transaction.id, "money request accepted");
      }
    }

    let resolved = request.clone();
    drop(request);

    let (title, verb) = match resolved.status {
      MoneyRequestStatus::Accepted => ("Money Request Accepted", "accepted"),
      _ => ("Money Request Declined", "declined"),
    };
    self
      .engine
      .notify(
        resolved.requester,
        title,
        format!(
          "Your request of {} was {}",
          resolved.amount.round_dp(AMOUNT_SCALE),
          verb
        ),
      );

    Ok(resolved)
  }

  /// Returns the request if the caller is its requester or its target.
  pub async fn find(&self, ctx: &CallerContext, id: MoneyRequestId) -> Result<MoneyRequest> {
    let request = self.entry(id)?.lock().await.clone();
    if request.requester == ctx.account || request.target == ctx.account {
      Ok(request)
    } else {
      Err(LedgerError::MoneyRequestNotFound(id))
    }
  }

  /// Pending requests awaiting an answer from the caller, oldest first.
  pub async fn pending_for(&self, ctx: &CallerContext) -> Result<Vec<MoneyRequest>> {
    let entries: Vec<Arc<Mutex<MoneyRequest>>> = self
      .requests
      .read()
      .map_err(poisoned)?
      .values()
      .cloned()
      .collect();

    let mut pending = Vec::new();
    for entry in entries {
      let request = entry.lock().await;
      if request.target == ctx.account && request.status == MoneyRequestStatus::Pending {
        pending.push(request.clone());
      }
    }
    pending.sort_by_key(|request| request.id);
    Ok(pending)
  }

  fn entry(&self, id: MoneyRequestId) -> Result<Arc<Mutex<MoneyRequest>>> {
    self
      .requests
      .read()
      .map_err(poisoned)?
      .get(&id)
      .cloned()
      .ok_or(LedgerError::MoneyRequestNotFound(id))
  }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> LedgerError {
  LedgerError::Persistence("money request index lock poisoned".to_string())
}
