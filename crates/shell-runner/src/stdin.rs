//! Stdin forwarding for the child process
//!
//! Input lines arrive over a channel and are written to the child's
//! stdin with a trailing newline. Once the process goes away the
//! remaining input has no receiver, so forwarding simply stops.

use async_channel::Receiver;
use futures::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;

/// Handle for writing to a child process's stdin
pub(crate) struct StdinHandle {
    stdin: Option<async_process::ChildStdin>,
}

impl StdinHandle {
    pub(crate) fn new(stdin: async_process::ChildStdin) -> Self {
        Self { stdin: Some(stdin) }
    }

    /// Write a line to stdin (adds newline) and flush
    pub(crate) async fn write_line(&mut self, line: &str) -> Result<()> {
        if let Some(stdin) = &mut self.stdin {
            stdin.write_all(line.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await?;
        }
        Ok(())
    }

    /// Forward queued input lines until the channel closes or the pipe breaks
    ///
    /// Dropping the returned future (or reaching either end condition)
    /// closes the child's stdin, signalling EOF.
    pub(crate) async fn forward(mut self, input: Receiver<String>) {
        while let Ok(line) = input.recv().await {
            if let Err(err) = self.write_line(&line).await {
                // Broken pipe: the process exited; input is a no-op now
                debug!(error = %err, "stdin write failed, stopping forwarding");
                break;
            }
        }
        self.close();
    }

    /// Close stdin by dropping the writer
    pub(crate) fn close(&mut self) {
        self.stdin.take();
    }
}
