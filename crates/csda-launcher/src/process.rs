//! Process management traits and types

use async_trait::async_trait;
use crate::error::{Error, Result};

/// A handle to a running analyzer process
///
/// A spawned process cannot be cancelled through its handle. It runs until it
/// exits or is killed from outside.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID
    fn pid(&self) -> Option<u32>;

    /// Wait for the process to complete and return its exit status
    async fn wait(&mut self) -> Result<ExitStatus>;
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code if the process exited normally
    pub code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    #[cfg(unix)]
    pub signal: Option<i32>,
}

impl ExitStatus {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Signal that terminated the process, always `None` off Unix
    fn terminating_signal(&self) -> Option<i32> {
        #[cfg(unix)]
        {
            self.signal
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    /// A single numeric code for this status
    ///
    /// Signal terminations map to `128 + signal`, as shells report them.
    /// Returns `-1` when neither a code nor a signal is known.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.terminating_signal()) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => -1,
        }
    }

    /// `Ok` on exit code 0, the matching failure otherwise
    pub fn into_result(self) -> Result<()> {
        match (self.code, self.terminating_signal()) {
            (Some(0), _) => Ok(()),
            (Some(code), _) => Err(Error::NonZeroExit { code }),
            (None, Some(signal)) => Err(Error::SignalTerminated { signal }),
            (None, None) => Err(Error::NonZeroExit { code: -1 }),
        }
    }
}

/// Exit status together with the captured output
#[derive(Debug, Clone)]
pub struct ExitResult {
    /// The exit status of the process
    pub status: ExitStatus,
    /// Everything written to standard output
    pub stdout: String,
    /// Everything written to standard error
    pub stderr: String,
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            #[cfg(unix)]
            signal: {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            },
        }
    }
}
