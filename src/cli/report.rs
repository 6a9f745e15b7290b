//! CLI commands for reports
//!
//! Balance overview, category rankings and month reports.

use clap::Subcommand;

use crate::clock::Clock;
use crate::config::Settings;
use crate::display::{format_balance_overview, format_category_totals, format_month_report};
use crate::error::TallyResult;
use crate::models::TransactionType;
use crate::reports::YearMonth;
use crate::services::LedgerService;
use crate::storage::SnapshotStore;

/// Report commands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Show the current balance and totals
    Balance,

    /// Show category totals, largest first
    #[command(alias = "cats")]
    Categories {
        /// Income or expense categories
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Restrict to one month (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,
        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show a month's summary, balance trajectory and top categories
    Month {
        /// Month to report on (YYYY-MM), defaults to the current month
        month: Option<YearMonth>,
        /// Which categories to rank
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Handle a report command
pub fn handle_report_command<S, C>(
    service: &LedgerService<S, C>,
    settings: &Settings,
    cmd: ReportCommands,
) -> TallyResult<()>
where
    S: SnapshotStore,
    C: Clock,
{
    match cmd {
        ReportCommands::Balance => {
            print!("{}", format_balance_overview(service.ledger(), settings));
        }

        ReportCommands::Categories { kind, month, top } => {
            let (title, mut totals) = match month {
                Some(month) => (
                    format!("{} categories for {}", kind_label(kind), month),
                    service.month_category_totals(month, kind, usize::MAX),
                ),
                None => (
                    format!("{} categories", kind_label(kind)),
                    service.category_totals(kind),
                ),
            };
            if let Some(top) = top {
                totals.truncate(top);
            }
            print!("{}", format_category_totals(&title, &totals, settings));
        }

        ReportCommands::Month { month, kind, top } => {
            let month = month.unwrap_or_else(|| YearMonth::of(service.today()));
            let limit = top.unwrap_or(settings.top_categories);

            let summary = service.month_summary(month);
            let series = service.month_series(month);
            let ranked = service.month_category_totals(month, kind, limit);

            print!(
                "{}",
                format_month_report(&summary, &series, &ranked, kind, settings)
            );
        }
    }

    Ok(())
}

fn kind_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
    }
}
