//! Process launching with redirected stdio

use async_process::{Child, ChildStderr, ChildStdout, Stdio};
use futures_lite::io::{AsyncBufReadExt, BufReader, Lines};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::options::ProcessOptions;
use crate::stdin::StdinHandle;

/// Immutable snapshot of the launch outcome
///
/// Created the instant the OS spawn call succeeds or fails, never
/// mutated afterward. A refused launch (bad path, permissions) is a
/// reported outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartInfo {
    /// Whether the OS successfully launched the process
    pub started: bool,
    /// OS process id, present only if started
    pub process_id: Option<u32>,
}

impl StartInfo {
    pub(crate) fn launched(pid: u32) -> Self {
        Self {
            started: true,
            process_id: Some(pid),
        }
    }

    pub(crate) fn failed() -> Self {
        Self {
            started: false,
            process_id: None,
        }
    }
}

/// A successfully launched process and its stream handles
///
/// Exclusively owned by one lifecycle controller per invocation; the
/// handles are released once the run finalizes.
pub(crate) struct LaunchedProcess {
    pub(crate) child: Child,
    pub(crate) stdout: Lines<BufReader<ChildStdout>>,
    pub(crate) stderr: Lines<BufReader<ChildStderr>>,
    pub(crate) stdin: StdinHandle,
}

/// Starts the OS process described by a set of options
pub(crate) struct ProcessLauncher;

impl ProcessLauncher {
    /// Attempt to start the process, redirecting all three stdio streams
    ///
    /// OS-level refusal to start yields `StartInfo { started: false }`
    /// and no process; it is never raised as an error.
    pub(crate) fn start(options: &ProcessOptions) -> (StartInfo, Option<LaunchedProcess>) {
        let mut cmd = options.prepare();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(command = options.command(), error = %err, "failed to spawn process");
                return (StartInfo::failed(), None);
            }
        };

        let pid = child.id();
        debug!(command = options.command(), pid, "process started");

        let (Some(stdout), Some(stderr), Some(stdin)) =
            (child.stdout.take(), child.stderr.take(), child.stdin.take())
        else {
            // Piped stdio was requested; missing handles mean the spawn
            // is unusable. Treat it like a failed launch.
            warn!(command = options.command(), pid, "spawned process is missing stdio handles");
            let _ = child.kill();
            return (StartInfo::failed(), None);
        };

        let launched = LaunchedProcess {
            child,
            stdout: BufReader::new(stdout).lines(),
            stderr: BufReader::new(stderr).lines(),
            stdin: StdinHandle::new(stdin),
        };

        (StartInfo::launched(pid), Some(launched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_is_reported_not_raised() {
        let options = ProcessOptions::builder("this_command_does_not_exist_12345")
            .build()
            .unwrap();

        let (start_info, launched) = ProcessLauncher::start(&options);

        assert!(!start_info.started);
        assert!(start_info.process_id.is_none());
        assert!(launched.is_none());
    }

    #[test]
    fn test_spawn_success_has_pid_and_handles() {
        let options = ProcessOptions::builder("echo").arg("hello").build().unwrap();

        let (start_info, launched) = ProcessLauncher::start(&options);

        assert!(start_info.started);
        assert!(start_info.process_id.is_some());
        let mut launched = launched.unwrap();
        // Reap the child so the test leaves nothing behind
        futures::executor::block_on(async {
            let _ = launched.child.status().await;
        });
    }
}
