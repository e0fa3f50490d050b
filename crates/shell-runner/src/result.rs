//! Terminal result model

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::launcher::StartInfo;
use crate::output::{OutputAggregator, OutputLine, OutputSource};

/// Immutable snapshot of a finished run
///
/// Assembled exactly once, after the process has terminated (or the
/// launch was refused) and the exit delay has elapsed. A timed-out
/// command yields `exited == false` with no exit code; a never-started
/// command additionally has empty output logs. Both are valid terminal
/// states, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitResult {
    /// Outcome of the launch attempt
    pub start_info: StartInfo,
    /// True only if the process terminated on its own and its exit was observed
    pub exited: bool,
    /// OS exit code; absent when the process was killed or never ran
    pub exit_code: Option<i32>,
    /// Wall-clock time from launch attempt to finalization
    pub elapsed: Duration,
    /// Captured stdout lines, in arrival order
    pub standard_output: Vec<OutputLine>,
    /// Captured stderr lines, in arrival order
    pub error_output: Vec<OutputLine>,
}

impl ExitResult {
    /// Returns true if the process exited on its own with code 0
    pub fn success(&self) -> bool {
        self.exited && self.exit_code == Some(0)
    }
}

/// Composes the final result once a run has finalized
pub(crate) struct ResultAssembler;

impl ResultAssembler {
    /// Pure composition: no side effects beyond building the record
    pub(crate) fn assemble(
        start_info: StartInfo,
        exited: bool,
        exit_code: Option<i32>,
        elapsed: Duration,
        output: &OutputAggregator,
    ) -> ExitResult {
        ExitResult {
            start_info,
            exited,
            // A killed process never reports an exit code
            exit_code: if exited { exit_code } else { None },
            elapsed,
            standard_output: output.snapshot(OutputSource::Stdout),
            error_output: output.snapshot(OutputSource::Stderr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_started_result_is_empty() {
        let output = OutputAggregator::new();
        let result = ResultAssembler::assemble(
            StartInfo {
                started: false,
                process_id: None,
            },
            false,
            None,
            Duration::from_millis(1),
            &output,
        );

        assert!(!result.start_info.started);
        assert!(!result.exited);
        assert!(result.exit_code.is_none());
        assert!(result.standard_output.is_empty());
        assert!(result.error_output.is_empty());
        assert!(!result.success());
    }

    #[test]
    fn test_killed_result_has_no_exit_code() {
        let output = OutputAggregator::new();
        let result = ResultAssembler::assemble(
            StartInfo {
                started: true,
                process_id: Some(42),
            },
            false,
            Some(137),
            Duration::from_secs(4),
            &output,
        );

        assert!(!result.exited);
        assert_eq!(result.exit_code, None);
    }

    #[test]
    fn test_success() {
        let output = OutputAggregator::new();
        output.push(OutputSource::Stdout, "done".to_string());

        let result = ResultAssembler::assemble(
            StartInfo {
                started: true,
                process_id: Some(42),
            },
            true,
            Some(0),
            Duration::from_millis(10),
            &output,
        );

        assert!(result.success());
        assert_eq!(result.standard_output.len(), 1);
    }
}
