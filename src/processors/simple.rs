use anyhow::Result;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::io::{AccountsReportWriter, CommandsReader};
use crate::ledger::{CommandProcessor, TransferOutcome};

/// This is a simple processor that replays commands against a wallet:
/// - reads commands from a [`CommandsReader`]
/// - executes them one at a time with a [`CommandProcessor`]
/// - writes a report including the state of the accounts using an [`AccountsReportWriter`]
///
/// The replay is resilient: malformed records and rejected commands are logged and skipped,
/// only a failure writing the report ends it with an error.
pub async fn run<R, P, W>(
  mut commands_reader: R,
  processor: P,
  mut accounts_report_writer: W,
) -> Result<()>
where
  R: CommandsReader,
  P: CommandProcessor,
  W: AccountsReportWriter,
{
  let mut commands = commands_reader.read_commands();
  let mut line = 0usize;

  while let Some(maybe_command) = commands.next().await {
    line += 1;
    let command = match maybe_command {
      Ok(command) => command,
      Err(err) => {
        warn!(line, error = %err, "skipping malformed record");
        continue;
      }
    };

    let account = command.account_id();
    let amount = command.amount();
    match processor.process(command).await {
      Ok(Some(transaction)) => {
        let outcome = TransferOutcome::success(&transaction, None);
        info!(line, account, ?outcome, kind = %transaction.kind, "transaction completed");
      }
      Ok(None) => debug!(line, account, "command applied"),
      Err(err) => {
        let outcome = TransferOutcome::failure(&err, amount);
        warn!(line, account, ?outcome, error = %err, "command rejected");
      }
    }
  }

  let report = processor.accounts_report().await?;
  accounts_report_writer
    .write_accounts_report(report.into_iter())
    .await
}
