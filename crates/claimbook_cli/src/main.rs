//! claimbook CLI - creditor claim ledger generator

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use claimbook_xlsx::{
    C_FILE_OUT_DEFAULT, EnumLayoutVersion, SpecLedgerOptions, derive_default_ledger_options,
    derive_sample_creditor_records, load_creditor_records_from_ipc_file, write_ledger_workbook,
};
use log::{error, info};

#[derive(Parser)]
#[command(name = "claimbook")]
#[command(
    author,
    version,
    about = "Generate a creditor claim ledger workbook"
)]
struct Cli {
    /// Output workbook path
    #[arg(short, long, default_value = C_FILE_OUT_DEFAULT)]
    output: PathBuf,

    /// Block layout preset
    #[arg(long, value_enum, default_value_t = ArgLayout::V2)]
    layout: ArgLayout,

    /// Data rows per creditor table (overrides the preset)
    #[arg(long)]
    block_height: Option<usize>,

    /// Rows between the starts of consecutive creditor tables (overrides the preset)
    #[arg(long)]
    row_gap: Option<usize>,

    /// Protect the claim sheet so only input columns are editable
    #[arg(long)]
    protect: bool,

    /// Arrow IPC file with `name` and `id` columns (default: built-in sample list)
    #[arg(long)]
    creditors: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArgLayout {
    V1,
    V2,
}

impl From<ArgLayout> for EnumLayoutVersion {
    fn from(value: ArgLayout) -> Self {
        match value {
            ArgLayout::V1 => EnumLayoutVersion::V1,
            ArgLayout::V2 => EnumLayoutVersion::V2,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level_default = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level_default))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = derive_options(cli);

    let records = match &cli.creditors {
        Some(path) => load_creditor_records_from_ipc_file(path)
            .with_context(|| format!("Failed to load creditors from '{}'", path.display()))?,
        None => derive_sample_creditor_records(),
    };

    let report = write_ledger_workbook(&records, &options, cli.output.clone())
        .with_context(|| format!("Failed to write '{}'", cli.output.display()))?;

    for sheet in &report.sheets {
        info!(
            "{}: {} cells, {} rules, {} tables",
            sheet.sheet_name, sheet.n_cells, sheet.n_rules, sheet.n_tables
        );
    }
    info!(
        "{} creditors written to {}",
        records.len(),
        cli.output.display()
    );
    Ok(())
}

fn derive_options(cli: &Cli) -> SpecLedgerOptions {
    let mut options = derive_default_ledger_options();
    options.layout = EnumLayoutVersion::from(cli.layout).layout();
    if let Some(height_block) = cli.block_height {
        options.layout.height_block = height_block;
    }
    if let Some(row_gap) = cli.row_gap {
        options.layout.row_gap = row_gap;
    }
    options.if_protect_main = cli.protect;
    options
}
