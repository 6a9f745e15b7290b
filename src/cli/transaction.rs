//! Transaction CLI commands
//!
//! Implements the commands that record, list and remove transactions.

use chrono::NaiveDate;
use clap::Subcommand;

use crate::clock::Clock;
use crate::config::Settings;
use crate::display::{
    format_money, format_transaction_details, format_transaction_short, format_transaction_table,
};
use crate::error::{TallyError, TallyResult};
use crate::models::{Money, NewTransaction, TransactionId, TransactionType};
use crate::reports::{DurationWindow, TransactionFilter};
use crate::services::LedgerService;
use crate::storage::SnapshotStore;

/// Transaction commands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Record an income or expense
    Add {
        /// Transaction type (income or expense)
        kind: TransactionType,
        /// Category name
        category: String,
        /// Amount (e.g., "200" or "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List transactions, most recent first
    List {
        /// Only this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Only the last today, 7days, 30days or 3months
        #[arg(short, long, conflicts_with = "date")]
        window: Option<DurationWindow>,
        /// Only income or expense
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// Ignore the configured default window
        #[arg(short, long, conflicts_with_all = ["date", "window"])]
        all: bool,
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        id: TransactionId,
    },
    /// Delete a transaction
    #[command(alias = "rm")]
    Delete {
        /// Transaction ID
        id: TransactionId,
    },
    /// Delete every transaction
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command<S, C>(
    service: &mut LedgerService<S, C>,
    settings: &Settings,
    cmd: TransactionCommands,
) -> TallyResult<()>
where
    S: SnapshotStore,
    C: Clock,
{
    match cmd {
        TransactionCommands::Add {
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let amount = Money::parse(&amount).map_err(|e| {
                TallyError::Validation(format!(
                    "Invalid amount: '{}'. Use a format like '200' or '12.50'. Error: {}",
                    amount, e
                ))
            })?;
            let date = date.unwrap_or_else(|| service.today());
            let input = NewTransaction::new(
                kind,
                category,
                amount,
                date,
                description.unwrap_or_default(),
            );

            let txn = service.add(input)?;

            println!("Added {}", format_transaction_short(&txn, settings));
            println!(
                "Balance: {}",
                format_money(service.current_balance(), settings)
            );
        }

        TransactionCommands::List {
            date,
            window,
            kind,
            all,
            limit,
        } => {
            let window = if all {
                None
            } else {
                window.or(settings.default_window)
            };

            let mut filter = TransactionFilter::new();
            if let Some(date) = date {
                filter = filter.on(date);
            } else if let Some(window) = window {
                filter = filter.within(window);
            }
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }

            let mut transactions = service.filter(&filter);
            let total = transactions.len();
            if let Some(limit) = limit {
                transactions.truncate(limit);
            }

            println!("{}", format_transaction_table(&transactions, settings));
            if transactions.len() < total {
                println!("Showing {} of {} transactions", transactions.len(), total);
            }
        }

        TransactionCommands::Show { id } => {
            let txn = service
                .ledger()
                .get(id)
                .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;
            print!("{}", format_transaction_details(txn, settings));
        }

        TransactionCommands::Delete { id } => {
            let txn = service.remove(id)?;
            println!("Deleted {}", format_transaction_short(&txn, settings));
            println!(
                "Balance: {}",
                format_money(service.current_balance(), settings)
            );
        }

        TransactionCommands::Clear { yes } => {
            let count = service.ledger().len();
            if !yes {
                println!(
                    "This will delete all {} transactions. Re-run with --yes to confirm.",
                    count
                );
                return Ok(());
            }
            service.clear()?;
            println!("Cleared {} transactions", count);
        }
    }

    Ok(())
}
