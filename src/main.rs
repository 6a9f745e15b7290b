use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tally::cli::{
    handle_config_command, handle_export_command, handle_report_command,
    handle_transaction_command, ConfigCommands, ExportArgs, ReportCommands, TransactionCommands,
};
use tally::clock::SystemClock;
use tally::config::{paths::DATA_DIR_ENV, Settings, TallyPaths};
use tally::services::LedgerService;
use tally::storage::FileStore;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Terminal-based personal income and expense ledger",
    long_about = "Tally records dated income and expense entries, keeps a running \
                  balance, totals spending by category and exports everything to CSV."
)]
struct Cli {
    /// Directory holding settings and data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Transaction(TransactionCommands),

    #[command(flatten)]
    Report(ReportCommands),

    /// Export all transactions to CSV
    Export(ExportArgs),

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

fn main() -> Result<()> {
    tally::init_tracing();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => TallyPaths::with_base_dir(dir),
        None => TallyPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    let Some(command) = cli.command else {
        println!("Tally - personal income and expense ledger");
        println!();
        println!("Run 'tally --help' for usage information.");
        return Ok(());
    };

    match command {
        Commands::Transaction(cmd) => {
            let mut service = open_ledger(&paths)?;
            handle_transaction_command(&mut service, &settings, cmd)?;
        }
        Commands::Report(cmd) => {
            let service = open_ledger(&paths)?;
            handle_report_command(&service, &settings, cmd)?;
        }
        Commands::Export(args) => {
            let service = open_ledger(&paths)?;
            handle_export_command(&service, &paths, args)?;
        }
        Commands::Config { action } => {
            handle_config_command(&paths, &mut settings, action)?;
        }
    }

    Ok(())
}

fn open_ledger(paths: &TallyPaths) -> Result<LedgerService<FileStore, SystemClock>> {
    paths.ensure_directories()?;
    let store = FileStore::open(paths.store_file())?;
    Ok(LedgerService::open(store, SystemClock)?)
}
