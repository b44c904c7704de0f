//! Scripted transport for tests.
//!
//! Replays canned device output against the [`Transport`] contract so
//! session and controller behavior can be exercised without hardware.

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// One scripted reply, consumed per written command in order.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Queue these lines for subsequent reads.
    Lines(Vec<String>),
    /// Produce no output, driving the caller to its deadline.
    Silence,
    /// Fail the next read with an I/O error.
    ReadError,
}

impl Reply {
    /// Convenience constructor from string slices.
    pub fn lines(lines: &[&str]) -> Self {
        Self::Lines(lines.iter().map(ToString::to_string).collect())
    }
}

/// In-memory transport driven by a reply script.
pub struct MockTransport {
    open: bool,
    fail_open: bool,
    fail_read: bool,
    script: VecDeque<Reply>,
    pending: VecDeque<String>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    /// Creates a mock that answers written commands with `script`, in order.
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            open: false,
            fail_open: false,
            fail_read: false,
            script: script.into(),
            pending: VecDeque::new(),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes `open` fail, simulating a missing or busy port.
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Returns a handle to the commands written so far.
    pub fn writes_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.writes)
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_open {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such port",
                )));
            }
            self.open = true;
            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.open = false;
            Ok(())
        })
    }

    fn write_line<'a>(
        &'a mut self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if !self.open {
                return Err(Error::NotConnected);
            }
            self.writes.lock().unwrap().push(line.to_string());
            match self.script.pop_front() {
                Some(Reply::Lines(lines)) => self.pending.extend(lines),
                Some(Reply::ReadError) => self.fail_read = true,
                Some(Reply::Silence) | None => {}
            }
            Ok(())
        })
    }

    fn read_line(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_read {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "simulated read failure",
                )));
            }
            Ok(self.pending.pop_front())
        })
    }

    fn has_pending_data(&self) -> bool {
        self.fail_read || !self.pending.is_empty()
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
