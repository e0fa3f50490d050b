//! Tests for timeout enforcement and forced kills

use std::time::{Duration, Instant};

use shell_runner::{ProcessOptions, ShellCommand};

#[smol_potat::test]
async fn test_timeout_kills_long_running_command() {
    let options = ProcessOptions::builder("sleep")
        .arg("10")
        .command_timeout(Duration::from_millis(300))
        .exit_delay(Duration::from_millis(100))
        .build()
        .unwrap();

    let started_at = Instant::now();
    let result = ShellCommand::new(options).execute_async().await;

    assert!(result.start_info.started);
    assert!(!result.exited);
    assert!(result.exit_code.is_none());
    // Killed long before the 10s sleep would have finished
    assert!(started_at.elapsed() < Duration::from_secs(3));
}

#[cfg(unix)]
#[smol_potat::test]
async fn test_killed_process_is_gone_from_process_table() {
    use nix::sys::signal;
    use nix::unistd::Pid;

    let options = ProcessOptions::builder("sleep")
        .arg("10")
        .command_timeout(Duration::from_millis(200))
        .exit_delay(Duration::from_millis(100))
        .build()
        .unwrap();

    let result = ShellCommand::new(options).execute_async().await;

    let pid = result.start_info.process_id.unwrap();
    // Signal 0 probes existence; the killed child was reaped during the
    // exit delay, so the pid must no longer be ours.
    let probe = signal::kill(Pid::from_raw(pid as i32), None);
    assert!(probe.is_err(), "process {} still present", pid);
}

#[smol_potat::test]
async fn test_fast_command_beats_generous_timeout() {
    let options = ProcessOptions::builder("sleep")
        .arg("0.1")
        .command_timeout(Duration::from_secs(10))
        .exit_delay(Duration::from_millis(50))
        .build()
        .unwrap();

    let started_at = Instant::now();
    let result = ShellCommand::new(options).execute_async().await;

    assert!(result.exited);
    assert_eq!(result.exit_code, Some(0));
    // The generous timeout must not stretch the run
    assert!(started_at.elapsed() < Duration::from_secs(5));
}

#[smol_potat::test]
async fn test_kill_race_with_immediate_exit() {
    // The command exits at the same moment the timeout fires; losing
    // the kill race must be swallowed, never raised.
    let options = ProcessOptions::builder("true")
        .command_timeout(Duration::from_millis(1))
        .exit_delay(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = ShellCommand::new(options).execute_async().await;

    assert!(result.start_info.started);
    if !result.exited {
        assert!(result.exit_code.is_none());
    }
}

#[smol_potat::test]
async fn test_elapsed_covers_exit_delay() {
    let options = ProcessOptions::builder("echo")
        .arg("quick")
        .command_timeout(Duration::from_secs(5))
        .exit_delay(Duration::from_millis(200))
        .build()
        .unwrap();

    let result = ShellCommand::new(options).execute_async().await;

    assert!(result.exited);
    assert!(result.elapsed >= Duration::from_millis(200));
}
