//! Transport layer for Flipper Zero communication.
//!
//! This module provides the abstraction for raw line I/O against the
//! device. Currently only USB/Serial is implemented.

pub mod serial;

#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Trait for transport implementations.
///
/// A transport does raw byte and line I/O with a bounded per-call wait;
/// it performs no retries and no response parsing.
pub trait Transport: Send + Sync {
    /// Opens the connection to the device.
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Closes the connection to the device.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Writes one newline-terminated line to the device.
    fn write_line<'a>(
        &'a mut self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Reads the next complete line from the device.
    ///
    /// Returns `None` when no full line arrives within the transport's
    /// inactivity window.
    fn read_line(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>>;

    /// Returns true if data is waiting to be read.
    fn has_pending_data(&self) -> bool;

    /// Returns true if the connection is open.
    fn is_open(&self) -> bool;
}

pub use serial::SerialTransport;
