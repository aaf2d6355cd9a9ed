//! Demo analysis orchestration
//!
//! [`Analyzer`] owns the lifecycle of one analyzer process per call:
//!
//! ```text
//! analyze(options)
//!     ↓
//! 1. Create the output directory (recursive, existing is fine)
//!     ↓
//! 2. Resolve the executable (override, or bundled binary for this platform)
//!     ↓
//! 3. Build the command line, notify on_start
//!     ↓
//! 4. Spawn, relay stdout/stderr chunks to observers as they arrive
//!     ↓
//! 5. On exit, relay what is already buffered, notify on_end with the code
//!     ↓
//! 6. Ok(()) on exit code 0, Err(NonZeroExit { code }) otherwise
//! ```
//!
//! Calls are independent: concurrent analyses each own their child process
//! and their observers only ever see their own output.

use async_io::Timer;
use futures::StreamExt;
use futures::future::{Either, select};
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::LocalLauncher;
use crate::command::Invocation;
use crate::error::{Error, Result};
use crate::event::{OutputEvent, OutputSource};
use crate::launcher::Launcher;
use crate::options::AnalyzeOptions;
use crate::platform::{self, BinaryLocator};
use crate::process::ProcessHandle;

/// How long output may stay quiet after the process exits before it is abandoned
const DRAIN_IDLE: Duration = Duration::from_millis(100);

/// Runs the analyzer through a [`Launcher`]
#[derive(Debug, Clone)]
pub struct Analyzer<L: Launcher = LocalLauncher> {
    /// The launcher used to spawn processes
    launcher: L,
    /// Where to find the bundled binary, `None` means next to the running executable
    locator: Option<BinaryLocator>,
}

impl Analyzer<LocalLauncher> {
    /// An analyzer spawning local processes
    pub fn local() -> Self {
        Self::new(LocalLauncher)
    }
}

impl Default for Analyzer<LocalLauncher> {
    fn default() -> Self {
        Self::local()
    }
}

impl<L: Launcher> Analyzer<L> {
    /// Create an analyzer with the given launcher
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            locator: None,
        }
    }

    /// Resolve bundled binaries with `locator` instead of the running executable's directory
    pub fn with_locator(mut self, locator: BinaryLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// The executable `options` will run
    pub fn binary_path(&self, options: &AnalyzeOptions) -> Result<PathBuf> {
        match (&options.executable_path, &self.locator) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(locator)) => locator.locate(),
            (None, None) => platform::locate(),
        }
    }

    /// Prepare and spawn the analyzer, returning its output stream and handle
    ///
    /// Invokes the start observer with the command line; the remaining
    /// observers are left to the caller driving the stream.
    pub async fn spawn(&self, options: &AnalyzeOptions) -> Result<(L::EventStream, L::Handle)> {
        let output_dir = &options.output_folder_path;
        async_fs::create_dir_all(output_dir)
            .await
            .map_err(|source| Error::DirectoryCreation {
                path: output_dir.clone(),
                source,
            })?;

        let binary = self.binary_path(options)?;
        let invocation = Invocation::build(options, binary);
        let command_line = invocation.command_line();
        tracing::debug!(command = %command_line, "Starting demo analysis");

        options.observers.start(&command_line);
        self.launcher.launch(&invocation).await
    }

    /// Analyze a demo, completing when the analyzer exits
    ///
    /// Succeeds only if the process exits with code 0. The end observer is
    /// called once with the exit code whenever the process ran, whatever the
    /// code; it is not called when the process could not be spawned.
    ///
    /// Completion follows the process exit, not the end of its output: a
    /// background process that inherited the pipes does not hold it back.
    /// Output still arriving after the exit is relayed before the end observer
    /// runs, until the pipes close or stay quiet for a short while.
    pub async fn analyze(&self, options: AnalyzeOptions) -> Result<()> {
        let (mut events, mut handle) = self.spawn(&options).await?;
        let observers = &options.observers;
        let relay = |event: OutputEvent| match event.source {
            OutputSource::Stdout => observers.stdout(&event.data),
            OutputSource::Stderr => observers.stderr(&event.data),
        };

        let mut wait = handle.wait();
        let exited = loop {
            match select(events.next(), &mut wait).await {
                Either::Left((Some(event), _)) => relay(event),
                Either::Left((None, _)) => break None,
                Either::Right((status, _)) => break Some(status),
            }
        };
        let status = match exited {
            Some(status) => status?,
            None => wait.await?,
        };

        // A background process may keep the pipes open, stop once they go quiet
        while let Either::Left((Some(event), _)) =
            select(events.next(), Timer::after(DRAIN_IDLE)).await
        {
            relay(event);
        }
        observers.end(status.exit_code());

        if !status.success() {
            tracing::warn!(
                demo = %options.demo_path.display(),
                code = status.exit_code(),
                "Demo analysis failed"
            );
        }
        status.into_result()
    }
}

/// Analyze a demo with the bundled analyzer for this platform
///
/// Shorthand for `Analyzer::local().analyze(options)`.
pub async fn analyze_demo(options: AnalyzeOptions) -> Result<()> {
    Analyzer::local().analyze(options).await
}
