//! Tests for basic command execution

use std::time::Duration;

use shell_runner::{ProcessOptions, ShellCommand};

#[test]
fn test_natural_completion() {
    futures::executor::block_on(async {
        let options = ProcessOptions::builder("echo")
            .arg("hello world")
            .command_timeout(Duration::from_secs(10))
            .exit_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = ShellCommand::new(options).execute_async().await;

        assert!(result.start_info.started);
        assert!(result.start_info.process_id.is_some());
        assert!(result.exited);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.success());
    });
}

#[test]
fn test_exit_code_propagation() {
    futures::executor::block_on(async {
        let options = ProcessOptions::builder("sh")
            .arg("-c")
            .arg("exit 42")
            .exit_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = ShellCommand::new(options).execute_async().await;

        assert!(result.exited);
        assert_eq!(result.exit_code, Some(42));
        assert!(!result.success());
    });
}

#[test]
fn test_command_not_found_is_reported() {
    futures::executor::block_on(async {
        let options = ProcessOptions::builder("this_command_does_not_exist_12345")
            .exit_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = ShellCommand::new(options).execute_async().await;

        assert!(!result.start_info.started);
        assert!(result.start_info.process_id.is_none());
        assert!(!result.exited);
        assert!(result.exit_code.is_none());
        assert!(result.standard_output.is_empty());
        assert!(result.error_output.is_empty());
    });
}

#[test]
fn test_command_with_env_vars() {
    futures::executor::block_on(async {
        let options = ProcessOptions::builder("sh")
            .arg("-c")
            .arg("echo $SHELL_RUNNER_TEST_VAR")
            .env("SHELL_RUNNER_TEST_VAR", "test_value")
            .exit_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = ShellCommand::new(options).execute_async().await;

        assert!(result.success());
        assert_eq!(result.standard_output[0].text, "test_value");
    });
}

#[test]
fn test_working_directory() {
    futures::executor::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().canonicalize().unwrap();

        let options = ProcessOptions::builder("pwd")
            .working_directory(dir.path())
            .exit_delay(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = ShellCommand::new(options).execute_async().await;

        assert!(result.success());
        let reported = std::path::Path::new(&result.standard_output[0].text)
            .canonicalize()
            .unwrap();
        assert_eq!(reported, expected);
    });
}

#[test]
fn test_blocking_execute() {
    let options = ProcessOptions::builder("echo")
        .arg("blocking")
        .exit_delay(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = ShellCommand::new(options).execute();

    assert!(result.success());
    assert_eq!(result.standard_output[0].text, "blocking");
}
