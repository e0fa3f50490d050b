//! Process options and builder

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_process::Command as AsyncCommand;

use crate::error::{Error, Result};

/// Default command timeout applied when the builder does not set one
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default post-exit grace period for draining buffered output
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_millis(250);

/// Immutable configuration for one managed command
///
/// Constructed through [`ProcessOptions::builder`]; validation happens
/// at `build()` time and never later. The command is always invoked
/// directly, with no shell interpretation.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    command: String,
    arguments: Vec<String>,
    env: HashMap<String, String>,
    env_clear: bool,
    working_directory: Option<PathBuf>,
    command_timeout: Duration,
    exit_delay: Duration,
}

impl ProcessOptions {
    /// Create a builder for the given executable
    pub fn builder(command: impl Into<String>) -> ProcessOptionsBuilder {
        ProcessOptionsBuilder {
            options: ProcessOptions {
                command: command.into(),
                arguments: Vec::new(),
                env: HashMap::new(),
                env_clear: false,
                working_directory: None,
                command_timeout: DEFAULT_COMMAND_TIMEOUT,
                exit_delay: DEFAULT_EXIT_DELAY,
            },
        }
    }

    /// The executable path or name
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The command-line arguments
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The environment variables set for the process
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// The working directory, if one was configured
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// Maximum wall-clock time before the process is force-killed
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Grace period after exit for draining buffered output
    pub fn exit_delay(&self) -> Duration {
        self.exit_delay
    }

    /// Convert to an `async_process::Command` ready for spawning
    pub(crate) fn prepare(&self) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.command);
        cmd.args(&self.arguments);

        if self.env_clear {
            cmd.env_clear();
        }
        for (key, val) in &self.env {
            cmd.env(key, val);
        }

        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }

        cmd
    }
}

/// Builder for [`ProcessOptions`]
#[derive(Debug)]
pub struct ProcessOptionsBuilder {
    options: ProcessOptions,
}

impl ProcessOptionsBuilder {
    /// Add an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.options.arguments.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.options.arguments.push(arg.into());
        }
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.options.env.insert(key.into(), val.into());
        self
    }

    /// Clear all inherited environment variables (except those explicitly set)
    pub fn env_clear(mut self) -> Self {
        self.options.env_clear = true;
        self
    }

    /// Set the working directory; unset means inherit the caller's
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.working_directory = Some(dir.into());
        self
    }

    /// Set the command timeout
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.options.command_timeout = timeout;
        self
    }

    /// Set the exit delay
    pub fn exit_delay(mut self, delay: Duration) -> Self {
        self.options.exit_delay = delay;
        self
    }

    /// Validate and build the options
    ///
    /// Fails fast with [`Error::InvalidOptions`] when the command is
    /// empty or all whitespace.
    pub fn build(self) -> Result<ProcessOptions> {
        if self.options.command.trim().is_empty() {
            return Err(Error::invalid_options("command must not be empty"));
        }
        Ok(self.options)
    }
}
