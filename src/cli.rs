//! Start-up helpers shared by the two binaries.

use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status when some rows or records were skipped or failed.
pub const EXIT_PARTIAL: u8 = 2;
/// Exit status for fatal errors.
pub const EXIT_FATAL: u8 = 1;

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load a `.env` file from the working directory (or a parent) if one
/// exists. Variables already set in the environment win.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// `0` when nothing failed, [`EXIT_PARTIAL`] otherwise.
pub fn exit_status(failures: usize) -> ExitCode {
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PARTIAL)
    }
}
