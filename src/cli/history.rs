//! History subcommand implementation.
//!
//! Handles `psu-remote history` for viewing and clearing past exchanges.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::{ExchangeRecord, HistoryStore};
use crate::types::RecordId;
use clap::Parser;
use std::io;

/// View and manage exchange history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent exchanges to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Show a single exchange by ID or ID prefix
    #[arg(long, value_name = "ID", conflicts_with = "clear")]
    pub show: Option<String>,

    /// Clear all exchange history
    #[arg(long)]
    pub clear: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx
            .history()?
            .ok_or_else(|| CliError::Other("no data directory available for history".to_string()))?;

        self.run(ctx, &store)
    }

    fn run(&self, ctx: &Context, store: &HistoryStore) -> CliResult<()> {
        if self.clear {
            let removed = store.clear()?;
            ctx.info(&format!("Removed {} exchange records", removed));
            return Ok(());
        }

        let records = match &self.show {
            Some(id) => vec![find(store, id)?],
            None => store.list_recent(self.count)?,
        };

        match self.output {
            OutputFormat::Plain if self.show.is_some() => {
                for record in &records {
                    output::print_record(record);
                }
            }
            OutputFormat::Plain => output::print_history(&records)?,
            OutputFormat::Json => output::print_json(&records)?,
            OutputFormat::Csv => output::write_history_csv(io::stdout().lock(), &records)?,
        }

        Ok(())
    }
}

/// Look a record up by full ID, or by prefix when shorter.
fn find(store: &HistoryStore, id: &str) -> CliResult<ExchangeRecord> {
    let record = if id.len() < 36 {
        store.find_by_prefix(id)?
    } else {
        let id: RecordId = id.parse()?;
        store.load(&id)?
    };
    Ok(record)
}
