//! Error types for binary resolution and demo analysis

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for launching the analyzer
#[derive(Error, Debug)]
pub enum Error {
    /// The running OS/architecture pair has no bundled executable
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// The offending `<os>-<arch>` key
        platform: String,
    },

    /// The output directory could not be created
    #[error("failed to create output directory {}: {source}", path.display())]
    DirectoryCreation {
        /// The directory that was being created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The operating system refused to start the child process
    #[error("failed to spawn {}: {source}", program.display())]
    SpawnFailed {
        /// The executable that was being launched
        program: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The child ran and exited with a non-zero code
    #[error("analyzer exited with code {code}")]
    NonZeroExit {
        /// The exit code reported by the child
        code: i32,
    },

    /// The child was terminated by a signal
    #[error("analyzer terminated by signal {signal}")]
    SignalTerminated {
        /// The signal number that terminated the process
        signal: i32,
    },

    /// Waiting on the child failed
    #[error("failed to wait for analyzer process: {source}")]
    Wait {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The directory of the running executable could not be determined
    #[error("failed to determine installation directory: {source}")]
    InstallDir {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Options could not be parsed
    #[error("invalid analyze options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl Error {
    /// Create an unsupported platform error for the given key
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Returns true if the failure happened before the child produced an exit status
    pub fn is_launch_failure(&self) -> bool {
        !matches!(
            self,
            Error::NonZeroExit { .. } | Error::SignalTerminated { .. }
        )
    }

    /// The exit code carried by a [`Error::NonZeroExit`] failure
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::NonZeroExit { code } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
