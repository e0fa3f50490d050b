//! Managed child process execution
//!
//! This crate runs a single OS process under a command timeout,
//! capturing timestamped stdout/stderr lines as they arrive and
//! reporting an immutable terminal result. Launch failures, timeouts
//! and kill races are reported as data in [`StartInfo`]/[`ExitResult`]
//! rather than raised as errors; only invalid configuration fails at
//! construction time.
//!
//! The crate is runtime-agnostic: it is built on `async-process`,
//! `futures-lite` and `async-io` and works under any executor (or
//! under a plain `block_on`).
//!
//! ```no_run
//! use std::time::Duration;
//! use shell_runner::{ProcessOptions, ShellCommand};
//!
//! # fn main() -> shell_runner::Result<()> {
//! let options = ProcessOptions::builder("ping")
//!     .arg("-c").arg("4").arg("localhost")
//!     .command_timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let command = ShellCommand::new(options);
//! let result = command.execute();
//! assert!(result.exited);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod launcher;
pub mod lifecycle;
pub mod options;
pub mod output;
pub mod result;
pub mod shell;
mod stdin;

pub use error::{Error, Result};
pub use launcher::StartInfo;
pub use lifecycle::LifecycleState;
pub use options::{ProcessOptions, ProcessOptionsBuilder};
pub use output::{OutputAggregator, OutputLine, OutputSource};
pub use result::ExitResult;
pub use shell::ShellCommand;
