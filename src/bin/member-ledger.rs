use std::fs::File;

use anyhow::{Context, Result};
use member_ledger::{
    bin_utils::{RowError, Service},
    config::LedgerConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the report, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config: LedgerConfig::from_env()?,
        error_printer: Box::new(|line, err| match err {
            RowError::Rejected(err) => {
                // business rejections, not input problems
                tracing::info!(line, %err, "operation rejected");
            }
            err => eprintln!("Error at line {line}: {err}"),
        }),
    };
    service.run()
}
