//! `csda` passthrough
//!
//! Resolves the analyzer bundled for this platform, forwards every argument to
//! it unchanged with inherited standard streams, and exits with its exit code.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Diagnostics go to stderr and stay quiet unless RUST_LOG asks for them
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")?;

    // Launch errors are reported as-is, without added context
    let args: Vec<_> = std::env::args_os().skip(1).collect();
    let status = smol::block_on(csda_launcher::passthrough(args))?;

    if !status.success() {
        std::process::exit(status.exit_code());
    }
    Ok(())
}
