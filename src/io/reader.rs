use std::convert::TryFrom;

use anyhow::Result;
use tokio::io::AsyncRead;
use tokio_stream::{Stream, StreamExt};

use crate::ledger::Command;

/// Number of columns of a command record: type, account, counterparty, amount, pin, reference
const RECORD_FIELDS: usize = 6;

/// Interface to read commands from an external source
pub trait CommandsReader {
  /// Read commands and return a [`Stream`] with one item per record,
  /// `Err` when the record could not be read or understood (like a wrong format).
  fn read_commands<'a>(&'a mut self) -> Box<dyn Stream<Item = Result<Command>> + Unpin + 'a>;
}

/// Implementation of [`CommandsReader`] for the CSV format.
///
/// Trailing empty columns can be omitted.
pub struct CsvCommandsReader<R>(R);

impl<R> CsvCommandsReader<R>
where
  R: AsyncRead + Unpin + Send + Sync,
{
  pub fn new(reader: R) -> Self {
    Self(reader)
  }
}

impl<R> CommandsReader for CsvCommandsReader<R>
where
  R: AsyncRead + Unpin + Send + Sync,
{
  fn read_commands<'a>(&'a mut self) -> Box<dyn Stream<Item = Result<Command>> + Unpin + 'a> {
    Box::new(
      csv_async::AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(&mut self.0)
        .into_records()
        .map(|maybe_record| {
          maybe_record
            .and_then(|mut record| {
              record.trim();
              while record.len() < RECORD_FIELDS {
                record.push_field("");
              }
              record.deserialize::<super::command::Command>(None)
            })
            .map_err(anyhow::Error::from)
            .and_then(Command::try_from)
        }),
    )
  }
}
