//! Facility Desk spreadsheet importer.
//!
//! Loads branches, assets or spare parts from an Excel workbook straight
//! into the database, using the same matching as the HTTP import endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Preview without writing
//! desk-import --kind branches --file branches.xlsx --dry-run
//!
//! # Import spare parts into a specific database
//! desk-import --kind spare-parts --file parts.xlsx --database sqlite://desk.db
//! ```

use std::path::PathBuf;

use clap::Parser;

use facility_desk::import::{read_path, ImportKind, Importer};
use facility_desk::logging;
use facility_desk::storage::DeskRepository;

/// Import an Excel workbook into Facility Desk.
#[derive(Parser, Debug)]
#[command(name = "desk-import")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What the workbook contains: branches, assets or spare-parts
    #[arg(long, short = 'k', value_parser = parse_kind)]
    kind: ImportKind,

    /// Workbook to read (.xlsx, .xls or .xlsb)
    #[arg(long, short = 'f', value_name = "PATH")]
    file: PathBuf,

    /// Database URL
    #[arg(
        long,
        env = "DESK__DATABASE__URL",
        default_value = "sqlite://facility-desk.db?mode=rwc"
    )]
    database: String,

    /// Parse and match rows without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Show debug output
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn parse_kind(s: &str) -> Result<ImportKind, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let repository = DeskRepository::connect(&cli.database, 1).await?;
    repository.init_schema().await?;

    let rows = read_path(&cli.file).await?;
    tracing::info!(
        file = %cli.file.display(),
        kind = %cli.kind,
        rows = rows.len(),
        dry_run = cli.dry_run,
        "Workbook loaded"
    );

    let report = Importer::new(repository)
        .run(cli.kind, &rows, cli.dry_run)
        .await?;

    for skipped in &report.skipped {
        tracing::warn!(row = skipped.row, reason = %skipped.reason, "Row skipped");
    }
    tracing::info!(
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped.len(),
        "Import finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
