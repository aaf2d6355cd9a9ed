//! Local process execution backend

use async_process::{Child, ChildStderr, ChildStdout, Stdio};
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::command::Invocation;
use crate::error::{Error, Result};
use crate::event::{ChunkReader, OutputEvent, OutputSource};
use crate::launcher::Launcher;
use crate::process::{ExitStatus, ProcessHandle};

/// Launcher for executing the analyzer locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLauncher;

/// A handle to a local analyzer process
pub struct LocalProcessHandle {
    /// The underlying child process
    child: Child,
}

/// Stream of output chunks from both pipes of a local process
pub struct OutputStream {
    stdout: Option<ChunkReader<ChildStdout>>,
    stderr: Option<ChunkReader<ChildStderr>>,
    /// Poll stderr first on the next call, so neither pipe starves
    stderr_first: bool,
}

#[async_trait]
impl Launcher for LocalLauncher {
    type EventStream = OutputStream;
    type Handle = LocalProcessHandle;

    async fn launch(&self, invocation: &Invocation) -> Result<(Self::EventStream, Self::Handle)> {
        let mut cmd = invocation.prepare();

        // Configure stdio for streaming
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use async_process::windows::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = cmd.spawn().map_err(|source| Error::SpawnFailed {
            program: invocation.program().to_path_buf(),
            source,
        })?;

        tracing::info!(pid = child.id(), program = %invocation.program().display(), "Spawned analyzer");

        let events = OutputStream {
            stdout: child.stdout.take().map(ChunkReader::new),
            stderr: child.stderr.take().map(ChunkReader::new),
            stderr_first: false,
        };

        Ok((events, LocalProcessHandle { child }))
    }
}

#[async_trait]
impl ProcessHandle for LocalProcessHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .status()
            .await
            .map_err(|source| Error::Wait { source })?;

        let status = ExitStatus::from(status);
        tracing::info!(pid = self.child.id(), code = ?status.code, "Analyzer exited");
        Ok(status)
    }
}

fn poll_source<R>(
    reader: &mut Option<ChunkReader<R>>,
    source: OutputSource,
    cx: &mut Context<'_>,
) -> Poll<Option<OutputEvent>>
where
    ChunkReader<R>: Stream<Item = std::io::Result<String>> + Unpin,
{
    let Some(stream) = reader else {
        return Poll::Ready(None);
    };

    match Pin::new(stream).poll_next(cx) {
        Poll::Ready(Some(Ok(data))) => Poll::Ready(Some(OutputEvent::new(source, data))),
        Poll::Ready(Some(Err(e))) => {
            tracing::warn!(?source, error = %e, "Failed reading analyzer output, closing pipe");
            *reader = None;
            Poll::Ready(None)
        }
        Poll::Ready(None) => {
            *reader = None;
            Poll::Ready(None)
        }
        Poll::Pending => Poll::Pending,
    }
}

impl Stream for OutputStream {
    type Item = OutputEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let stderr_first = this.stderr_first;

        for step in 0..2 {
            let poll_stderr = (step == 0) == stderr_first;
            let polled = if poll_stderr {
                poll_source(&mut this.stderr, OutputSource::Stderr, cx)
            } else {
                poll_source(&mut this.stdout, OutputSource::Stdout, cx)
            };

            if let Poll::Ready(Some(event)) = polled {
                this.stderr_first = !poll_stderr;
                return Poll::Ready(Some(event));
            }
        }

        // If both streams are closed, the stream is exhausted
        if this.stdout.is_none() && this.stderr.is_none() {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}
