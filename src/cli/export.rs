//! CLI command for CSV export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Args;

use crate::clock::Clock;
use crate::config::TallyPaths;
use crate::error::{TallyError, TallyResult};
use crate::services::LedgerService;
use crate::storage::SnapshotStore;

/// Arguments of `tally export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path, defaults to transactions_<today>.csv in the exports directory
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the CSV to standard output instead of a file
    #[arg(long)]
    pub stdout: bool,
}

/// Handle the export command
pub fn handle_export_command<S, C>(
    service: &LedgerService<S, C>,
    paths: &TallyPaths,
    args: ExportArgs,
) -> TallyResult<()>
where
    S: SnapshotStore,
    C: Clock,
{
    if args.stdout {
        let csv = service.export_csv()?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", csv)?;
        return Ok(());
    }

    let output = match args.output {
        Some(path) => path,
        None => paths.ensure_exports_dir()?.join(service.export_filename()),
    };

    let file = File::create(&output).map_err(|e| {
        TallyError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    let mut writer = BufWriter::new(file);
    service.write_csv(&mut writer)?;
    writer.flush()?;

    println!(
        "Exported {} transactions to: {}",
        service.ledger().len(),
        output.display()
    );
    Ok(())
}
