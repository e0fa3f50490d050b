//! Caller-facing shell command facade

use std::future::Future;
use std::sync::Mutex;

use async_channel::{Receiver, Sender};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::launcher::StartInfo;
use crate::lifecycle::LifecycleController;
use crate::options::ProcessOptions;
use crate::output::{lock, OutputAggregator, OutputLine, OutputSource};
use crate::result::ExitResult;

/// One managed command: launch, lifecycle and result in a single call
///
/// Construct with validated [`ProcessOptions`], optionally subscribe to
/// the live output streams and queue stdin input, then call
/// [`execute`](Self::execute) or [`execute_async`](Self::execute_async).
/// The facade is meant for a single execution; the completion handle
/// and the stdin channel observe the first run.
pub struct ShellCommand {
    options: ProcessOptions,
    output: OutputAggregator,
    input_tx: Sender<String>,
    input_rx: Mutex<Option<Receiver<String>>>,
    started_tx: Mutex<Option<oneshot::Sender<StartInfo>>>,
    started: Shared<BoxFuture<'static, StartInfo>>,
}

impl ShellCommand {
    /// Create a command from validated options
    pub fn new(options: ProcessOptions) -> Self {
        let (input_tx, input_rx) = async_channel::unbounded();
        let (started_tx, started_rx) = oneshot::channel();
        let started = started_rx
            .map(|outcome: Result<StartInfo, oneshot::Canceled>| {
                // A cancelled sender means the run was dropped before the
                // launch attempt; report it as a failed start.
                outcome.unwrap_or_else(|_| StartInfo {
                    started: false,
                    process_id: None,
                })
            })
            .boxed()
            .shared();

        Self {
            options,
            output: OutputAggregator::new(),
            input_tx,
            input_rx: Mutex::new(Some(input_rx)),
            started_tx: Mutex::new(Some(started_tx)),
            started,
        }
    }

    /// The options this command runs with
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Subscribe to live stdout lines
    pub fn standard_output(&self) -> Receiver<OutputLine> {
        self.output.subscribe(OutputSource::Stdout)
    }

    /// Subscribe to live stderr lines
    pub fn error_output(&self) -> Receiver<OutputLine> {
        self.output.subscribe(OutputSource::Stderr)
    }

    /// Stdout lines accumulated so far
    pub fn standard_output_snapshot(&self) -> Vec<OutputLine> {
        self.output.snapshot(OutputSource::Stdout)
    }

    /// Stderr lines accumulated so far
    pub fn error_output_snapshot(&self) -> Vec<OutputLine> {
        self.output.snapshot(OutputSource::Stderr)
    }

    /// Queue a line for the process's stdin
    ///
    /// Fire-and-forget: the line (plus terminator) is forwarded while
    /// the process runs. Once the process has exited or if it never
    /// started there is no receiver, and this is a silent no-op.
    pub fn write_input(&self, line: impl Into<String>) {
        let _ = self.input_tx.try_send(line.into());
    }

    /// Close the process's stdin after forwarding any queued input
    ///
    /// Line-reading children (`cat`, interactive REPLs) only exit
    /// naturally once they see EOF.
    pub fn close_input(&self) {
        self.input_tx.close();
    }

    /// Completion handle resolving to the launch outcome
    ///
    /// Resolves the instant the launch attempt concludes, always before
    /// the [`ExitResult`] future does. May be awaited by any number of
    /// tasks.
    pub fn started(&self) -> impl Future<Output = StartInfo> + Send + 'static {
        self.started.clone()
    }

    /// Run the command and suspend until the result is assembled
    ///
    /// Launch failure, timeout kill and kill races are reported in the
    /// returned [`ExitResult`], never raised.
    pub async fn execute_async(&self) -> ExitResult {
        // Single-use handles: a repeat execution runs the pipeline
        // again, but with a closed stdin channel and a detached
        // started-handle, since both observe the first run.
        let input_rx = lock(&self.input_rx).take().unwrap_or_else(|| {
            let (tx, rx) = async_channel::unbounded();
            tx.close();
            rx
        });
        let started_tx = lock(&self.started_tx)
            .take()
            .unwrap_or_else(|| oneshot::channel().0);

        let controller = LifecycleController::new(self.options.clone(), self.output.clone());
        controller.run(input_rx, started_tx).await
    }

    /// Blocking variant of [`execute_async`](Self::execute_async)
    pub fn execute(&self) -> ExitResult {
        futures_lite::future::block_on(self.execute_async())
    }
}
