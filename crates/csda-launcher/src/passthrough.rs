//! Raw command-line passthrough to the bundled analyzer
//!
//! Arguments are forwarded verbatim and the child inherits the parent's
//! standard streams. Nothing is intercepted or buffered.

use async_process::Stdio;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::command::Invocation;
use crate::error::{Error, Result};
use crate::platform::{self, BinaryLocator, PlatformKey};
use crate::process::ExitStatus;

/// Run the bundled analyzer for this platform with `args`
///
/// Fails with [`Error::UnsupportedPlatform`] before anything is spawned when
/// the host has no bundled binary.
pub async fn passthrough<I, S>(args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    platform::resolve_key(&PlatformKey::current())?;
    passthrough_from(&BinaryLocator::from_current_exe()?, args).await
}

/// Run the binary `locator` resolves with `args`
///
/// Fails with [`Error::UnsupportedPlatform`] before anything is spawned when
/// the locator's platform has no bundled binary.
pub async fn passthrough_from<I, S>(locator: &BinaryLocator, args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let binary = locator.locate()?;
    passthrough_with(binary, args).await
}

/// Run `binary` with `args`, inheriting stdin, stdout and stderr
///
/// Returns the child's exit status whatever its value; only a failure to
/// start the process is an error.
pub async fn passthrough_with<I, S>(binary: impl Into<PathBuf>, args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let invocation = Invocation::passthrough(binary, args);
    tracing::debug!(command = %invocation.command_line(), "Forwarding to analyzer");

    let mut cmd = invocation.prepare();
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    let status = cmd.status().await.map_err(|source| Error::SpawnFailed {
        program: invocation.program().to_path_buf(),
        source,
    })?;

    Ok(ExitStatus::from(status))
}
