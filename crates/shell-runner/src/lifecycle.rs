//! Timeout enforcement and process lifecycle
//!
//! The controller owns the child process for exactly one invocation.
//! It races natural exit against the command timeout, force-kills on
//! timeout, then holds a bounded exit-delay window so the readers can
//! flush whatever the OS still has buffered before the result is
//! assembled.

use std::future::Future;
use std::time::Instant;

use async_channel::Receiver;
use async_io::Timer;
use async_process::Child;
use futures::channel::oneshot;
use futures::future::FutureExt;
use futures::pin_mut;
use futures_lite::future;
use futures_lite::io::{BufReader, Lines};
use futures_lite::stream::StreamExt;
use tracing::{debug, info, warn};

use crate::launcher::{LaunchedProcess, ProcessLauncher, StartInfo};
use crate::options::ProcessOptions;
use crate::output::{OutputAggregator, OutputSource};
use crate::result::{ExitResult, ResultAssembler};

/// Lifecycle states for one managed invocation
///
/// `NotStarted -> Started | FailedToStart`; a started process either
/// `Exited` naturally or is `Killed` when the command timeout elapses
/// first; both paths pass through the exit-delay drain and end
/// `Finalized`. `FailedToStart` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Launch not yet attempted
    NotStarted,
    /// Process is running
    Started,
    /// The OS refused the launch; terminal
    FailedToStart,
    /// Process terminated on its own
    Exited,
    /// Process was force-killed after the command timeout
    Killed,
    /// Exit delay elapsed and the result was assembled; terminal
    Finalized,
}

/// Drives one process from launch to finalized result
pub(crate) struct LifecycleController {
    options: ProcessOptions,
    output: OutputAggregator,
}

impl LifecycleController {
    pub(crate) fn new(options: ProcessOptions, output: OutputAggregator) -> Self {
        Self { options, output }
    }

    /// Run the full pipeline: launch, race exit against the timeout,
    /// kill on timeout, drain for the exit delay, assemble the result.
    ///
    /// The whole lifecycle is a single future; the two reader loops and
    /// the stdin forwarder are driven as background futures of each
    /// phase, so no executor is required.
    pub(crate) async fn run(
        self,
        input: Receiver<String>,
        started_tx: oneshot::Sender<StartInfo>,
    ) -> ExitResult {
        let launch_instant = Instant::now();
        let mut state = LifecycleState::NotStarted;
        debug!(command = self.options.command(), ?state, "launching");

        let (start_info, launched) = ProcessLauncher::start(&self.options);
        // The started handle always resolves before the result does
        let _ = started_tx.send(start_info.clone());

        let Some(launched) = launched else {
            state = LifecycleState::FailedToStart;
            info!(command = self.options.command(), ?state, "process failed to start");
            self.output.close_subscribers();
            return ResultAssembler::assemble(
                start_info,
                false,
                None,
                launch_instant.elapsed(),
                &self.output,
            );
        };
        let LaunchedProcess {
            child,
            stdout,
            stderr,
            stdin,
        } = launched;
        let mut guard = ChildGuard { child };
        state = LifecycleState::Started;
        debug!(pid = guard.child.id(), ?state, "racing exit against command timeout");

        // One writer per output source; the two reader loops and the
        // stdin forwarder make progress during every phase below.
        let background = async {
            futures::join!(
                drain(stdout, OutputSource::Stdout, &self.output),
                drain(stderr, OutputSource::Stderr, &self.output),
                stdin.forward(input),
            );
        }
        .fuse();
        pin_mut!(background);

        // Race natural exit against the command timeout
        let outcome = {
            let wait = async { Some(guard.child.status().await) };
            let timeout = async {
                Timer::after(self.options.command_timeout()).await;
                None
            };
            drive(future::or(wait, timeout), &mut background).await
        };

        let (exited, exit_code) = match outcome {
            Some(Ok(status)) => {
                state = LifecycleState::Exited;
                debug!(code = ?status.code(), ?state, "process exited");
                (true, status.code())
            }
            Some(Err(err)) => {
                // Exit bookkeeping failed; the exit was never observed
                state = LifecycleState::Exited;
                warn!(error = %err, "failed to observe process exit");
                (false, None)
            }
            None => {
                state = LifecycleState::Killed;
                info!(
                    pid = guard.child.id(),
                    timeout_ms = self.options.command_timeout().as_millis() as u64,
                    ?state,
                    "command timeout elapsed, killing process"
                );
                kill(&mut guard.child);
                (false, None)
            }
        };

        // Exit-delay drain: a bounded window for the readers to flush
        // remaining buffered output. A killed child is reaped here;
        // SIGKILL cannot be caught, so the reap resolves promptly.
        let killed = state == LifecycleState::Killed;
        let settle = async {
            if killed {
                let _ = guard.child.status().await;
            }
            Timer::after(self.options.exit_delay()).await;
        };
        drive(settle, &mut background).await;

        state = LifecycleState::Finalized;
        self.output.close_subscribers();
        let elapsed = launch_instant.elapsed();
        info!(
            ?state,
            exited,
            code = ?exit_code,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finalized"
        );

        ResultAssembler::assemble(start_info, exited, exit_code, elapsed, &self.output)
    }
}

/// Kills the child on drop so no process outlives its controller
struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Best-effort release, including when the run future is dropped
        let _ = self.child.kill();
    }
}

/// Await `main` while also driving `background`
///
/// Completion of the background future never ends the wait; it simply
/// stops contributing work.
async fn drive<T>(
    main: impl Future<Output = T>,
    background: &mut (impl Future<Output = ()> + Unpin),
) -> T {
    future::or(main, async {
        background.await;
        future::pending().await
    })
    .await
}

/// Line-oriented reader loop for one output source
///
/// An I/O failure closes the stream and is logged; it never aborts the
/// lifecycle (best-effort capture).
async fn drain<R>(mut lines: Lines<BufReader<R>>, source: OutputSource, output: &OutputAggregator)
where
    R: futures_lite::AsyncRead + Unpin,
{
    while let Some(next) = lines.next().await {
        match next {
            Ok(text) => output.push(source, text),
            Err(err) => {
                warn!(?source, error = %err, "output reader failed, closing stream");
                break;
            }
        }
    }
}

/// Force-kill: SIGKILL on Unix, `Child::kill` elsewhere
///
/// Killing is idempotent best-effort. Losing the race against a
/// natural exit is expected and swallowed.
fn kill(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(child.id() as i32);
        if let Err(err) = signal::kill(pid, Signal::SIGKILL) {
            debug!(%pid, error = %err, "kill raced with process exit");
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = child.kill() {
            debug!(error = %err, "kill raced with process exit");
        }
    }
}
