use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncRead;
use tracing::info;

use wallet_ledger::config::LedgerConfig;
use wallet_ledger::io::{CsvAccountsReportWriter, CsvCommandsReader};
use wallet_ledger::ledger::{TracingNotificationSink, Wallet};
use wallet_ledger::{logging, processors};

#[tokio::main]
async fn main() -> Result<()> {
  let config = LedgerConfig::load()?;
  logging::init_logging(&config.logging)?;

  let reader = get_commands_async_read().await?;
  let commands_reader = CsvCommandsReader::new(reader);
  let wallet = Wallet::in_memory(&config, Arc::new(TracingNotificationSink))?;
  let accounts_report_writer = CsvAccountsReportWriter::new(tokio::io::stdout());

  info!("replaying commands");
  processors::simple::run(commands_reader, wallet, accounts_report_writer).await
}

type CommandsAsyncRead = Box<dyn AsyncRead + Unpin + Send + Sync>;

/// Reads the file named in the command line, or the stdin otherwise, which is convenient to pipe the data.
async fn get_commands_async_read() -> Result<CommandsAsyncRead> {
  match std::env::args().nth(1) {
    Some(path) => tokio::fs::File::open(path)
      .await
      .map(|file| Box::new(file) as CommandsAsyncRead)
      .map_err(anyhow::Error::from),
    None => Ok(Box::new(tokio::io::stdin()) as CommandsAsyncRead),
  }
}
