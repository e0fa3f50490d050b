//! Timestamped output capture with live fan-out

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_channel::{Receiver, Sender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One captured line of process output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputLine {
    /// When the owning reader received the line
    pub timestamp: DateTime<Utc>,
    /// The line text, without the trailing newline
    pub text: String,
}

impl OutputLine {
    pub(crate) fn now(text: String) -> Self {
        Self {
            timestamp: Utc::now(),
            text,
        }
    }
}

/// Which stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

#[derive(Default)]
struct SourceLog {
    lines: Vec<OutputLine>,
    subscribers: Vec<Sender<OutputLine>>,
    closed: bool,
}

/// Append-only capture of both output streams
///
/// Each source has a single writer (its reader loop), but the two
/// writers run concurrently with each other and with snapshot readers
/// and subscribers. Within one source no line is dropped or reordered;
/// no ordering is guaranteed between stdout and stderr.
#[derive(Clone, Default)]
pub struct OutputAggregator {
    stdout: Arc<Mutex<SourceLog>>,
    stderr: Arc<Mutex<SourceLog>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OutputAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, source: OutputSource) -> &Mutex<SourceLog> {
        match source {
            OutputSource::Stdout => &self.stdout,
            OutputSource::Stderr => &self.stderr,
        }
    }

    /// Subscribe to live lines from one source
    ///
    /// May be called before or during a run, any number of times. The
    /// channel closes once the run finalizes; subscribing after that
    /// point yields an already-closed channel rather than one that
    /// never delivers.
    pub fn subscribe(&self, source: OutputSource) -> Receiver<OutputLine> {
        let (tx, rx) = async_channel::unbounded();
        let mut log = lock(self.log(source));
        if log.closed {
            tx.close();
        } else {
            log.subscribers.push(tx);
        }
        rx
    }

    /// Append a line and publish it to live subscribers
    pub(crate) fn push(&self, source: OutputSource, text: String) {
        let line = OutputLine::now(text);
        let mut log = lock(self.log(source));
        log.lines.push(line.clone());
        log.subscribers
            .retain(|tx| tx.try_send(line.clone()).is_ok());
    }

    /// Snapshot of the lines accumulated so far for one source
    pub fn snapshot(&self, source: OutputSource) -> Vec<OutputLine> {
        lock(self.log(source)).lines.clone()
    }

    /// Drop all live subscriber channels, signalling end of stream
    ///
    /// Later subscriptions observe the closed state immediately.
    pub(crate) fn close_subscribers(&self) {
        for log in [&self.stdout, &self.stderr] {
            let mut log = lock(log);
            log.subscribers.clear();
            log.closed = true;
        }
    }
}
