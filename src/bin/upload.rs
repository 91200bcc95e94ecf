use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pretix_ifirma::DEFAULT_DOCUMENT_PATH;
use pretix_ifirma::cli::{EXIT_FATAL, exit_status, init_logging, load_dotenv};
use pretix_ifirma::upload::{Uploader, UploaderConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "ifirma-upload",
    version,
    about = "Upload converted invoices to iFirma"
)]
struct Cli {
    /// JSON document produced by ifirma-convert
    #[arg(default_value = DEFAULT_DOCUMENT_PATH)]
    input: PathBuf,

    /// Request timeout in seconds (overrides IFIRMA_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,
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
    load_dotenv().context("reading .env")?;
    let mut config = UploaderConfig::from_env()?;
    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }

    let uploader = Uploader::new(&config)?;
    let report = uploader
        .upload_file(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    for (record, err) in report.failures() {
        error!(record, "{err}");
    }
    info!(
        "{} invoices sent, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(exit_status(report.failed()))
}
