//! Launcher trait for spawning the analyzer

use crate::command::Invocation;
use crate::error::Result;
use crate::event::{OutputEvent, OutputSource};
use crate::process::{ExitResult, ProcessHandle};
use async_trait::async_trait;
use futures::stream::Stream;

/// Something that can start an [`Invocation`] as a child process
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    /// The output stream type this launcher produces
    ///
    /// Yields stdout and stderr chunks tagged with their source. Chunks of one
    /// source arrive in the order the child wrote them; the relative order of
    /// the two sources is unspecified. The stream ends once both pipes close.
    type EventStream: Stream<Item = OutputEvent> + Send + Unpin;

    /// The process handle type this launcher produces
    type Handle: ProcessHandle;

    /// Spawn exactly one process for `invocation`, returning its output stream and handle
    async fn launch(&self, invocation: &Invocation) -> Result<(Self::EventStream, Self::Handle)>;

    /// Run `invocation` to completion, capturing its output
    async fn execute(&self, invocation: &Invocation) -> Result<ExitResult> {
        use futures::StreamExt;

        let (mut events, mut handle) = self.launch(invocation).await?;
        let mut stdout = String::new();
        let mut stderr = String::new();

        while let Some(event) = events.next().await {
            match event.source {
                OutputSource::Stdout => stdout.push_str(&event.data),
                OutputSource::Stderr => stderr.push_str(&event.data),
            }
        }

        let status = handle.wait().await?;
        Ok(ExitResult {
            status,
            stdout,
            stderr,
        })
    }
}
