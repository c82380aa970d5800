//! This module contains the components needed to read commands and write reports from files (specifically CSV)
//!
//! The [`reader`] module reads [`Command`](crate::ledger::Command)s from CSV and the [`writer`] module writes the accounts report into CSV.
//! Other file formats can be added by implementing the traits [`CommandsReader`] and [`AccountsReportWriter`] respectively.
//!
//! The [`account`] and [`command`] modules contain the records used to serialize/deserialize data,
//! kept apart from the domain model so that the file format and the ledger can evolve independently.
//!

mod account;
mod command;
mod reader;
mod writer;

pub use reader::{CommandsReader, CsvCommandsReader};
pub use writer::{AccountsReportWriter, CsvAccountsReportWriter};
