//! This module contains the domain logic of the wallet ledger
//!
//! The [`LedgerEngine`] moves funds between accounts atomically, after checking the sender's PIN
//! with the [`PinAuthenticator`] and screening the transfer with the [`FraudGuard`].
//! Balances live in the [`AccountStore`] and every completed transfer is recorded in a [`TransactionLog`].
//!
//! The [`Wallet`] exposes the caller facing operations (send money, top-up, bills, QR payments,
//! money requests, history) on top of the engine, and replays [`Command`]s through [`CommandProcessor`].
//

mod account;
mod bill;
mod command;
mod engine;
mod error;
mod fraud;
mod log;
mod notify;
mod outcome;
mod pin;
mod qr;
mod requests;
mod transaction;
mod wallet;

pub use account::{Account, AccountId, AccountReport, AccountStore};
pub use bill::{Bill, BillId, BillReference, BillRegistry, BillType};
pub use command::Command;
pub use engine::{Authorization, CallerContext, LedgerEngine, TransferRequest, AMOUNT_SCALE};
pub use error::{ErrorKind, LedgerError, Result};
pub use fraud::{FraudGuard, FraudReason, FraudVerdict};
pub use log::{InMemoryTransactionLog, TransactionLog};
pub use notify::{NotificationSink, TracingNotificationSink};
pub use outcome::TransferOutcome;
pub use pin::{validate_pin, PinAuthenticator};
pub use qr::QrPayload;
pub use requests::{
  MoneyRequest, MoneyRequestId, MoneyRequestStatus, MoneyRequestWorkflow, RequestAction,
};
pub use transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
pub use wallet::{AccountSummary, CommandProcessor, Wallet};
