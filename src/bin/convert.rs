use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use pretix_ifirma::DEFAULT_DOCUMENT_PATH;
use pretix_ifirma::cli::{EXIT_FATAL, exit_status, init_logging};
use pretix_ifirma::convert::{Converter, ConverterConfigBuilder};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "ifirma-convert",
    version,
    about = "Convert a pretix order export into iFirma invoices"
)]
struct Cli {
    /// CSV export to read
    #[arg(default_value = "input.csv")]
    input: PathBuf,

    /// JSON document to write (replaced if it exists)
    #[arg(default_value = DEFAULT_DOCUMENT_PATH)]
    output: PathBuf,

    /// Issue date for rows without an order date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    issue_date: Option<NaiveDate>,

    /// Days between issue date and payment deadline
    #[arg(long, default_value_t = 7)]
    payment_days: u32,

    /// iFirma numbering series
    #[arg(long, default_value = "default")]
    series: String,

    /// Place of issue printed on every invoice; defaults to the buyer's city
    #[arg(long)]
    place: Option<String>,
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = ConverterConfigBuilder::new()
        .payment_days(cli.payment_days)
        .numbering_series(cli.series);
    if let Some(date) = cli.issue_date {
        config = config.issue_date(date);
    }
    if let Some(place) = cli.place {
        config = config.place_of_issue(place);
    }

    let report = Converter::new(config.build())
        .convert_file(&cli.input, &cli.output)
        .with_context(|| format!("converting {}", cli.input.display()))?;

    info!(
        "converted {} orders from {} rows into {} ({} skipped)",
        report.records.len(),
        report.rows_read,
        cli.output.display(),
        report.skipped.len()
    );
    Ok(exit_status(report.skipped.len()))
}
