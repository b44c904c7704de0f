//! Serial/USB transport implementation.
//!
//! This module provides serial port communication for Flipper Zero
//! devices connected via USB CDC.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::protocol::LineDecoder;
use crate::transport::Transport;

/// Default baud rate for the Flipper Zero CLI.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default inactivity window for a single line read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyACM0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Inactivity window for a single line read.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the line-read inactivity window.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Serial transport for Flipper Zero communication.
///
/// The CLI is half-duplex: the session layer writes one command and
/// drains response lines before the next command, so a single stream
/// with an incremental line decoder is sufficient.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
    decoder: LineDecoder,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
            decoder: LineDecoder::new(),
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!("opening serial port: {}", self.config.port);

            let mut stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            // RTS must be low or some CDC stacks stall the CLI prompt
            if let Err(e) = tokio_serial::SerialPort::write_request_to_send(&mut stream, false) {
                tracing::warn!("failed to set RTS: {}", e);
            }

            // Drop anything a previous session left in the device buffers
            if let Err(e) =
                tokio_serial::SerialPort::clear(&stream, tokio_serial::ClearBuffer::All)
            {
                tracing::warn!("failed to clear serial buffers: {}", e);
            }
            self.decoder.clear();

            self.stream = Some(stream);
            tracing::info!("serial port open");
            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("closing serial port: {}", self.config.port);
            }
            self.decoder.clear();
            Ok(())
        })
    }

    fn write_line<'a>(
        &'a mut self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

            tracing::trace!("sending command: {}", line);
            let framed = format!("{line}\r\n");
            stream.write_all(framed.as_bytes()).await.map_err(Error::Io)?;
            stream.flush().await.map_err(Error::Io)?;

            Ok(())
        })
    }

    fn read_line(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        Box::pin(async move {
            if let Some(line) = self.decoder.next_line() {
                return Ok(Some(line));
            }

            let read_timeout = self.config.read_timeout;
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

            let deadline = tokio::time::Instant::now() + read_timeout;
            let mut buf = [0u8; 256];

            loop {
                let now = tokio::time::Instant::now();
                if now >= deadline {
                    return Ok(None);
                }

                match tokio::time::timeout(deadline - now, stream.read(&mut buf)).await {
                    Ok(Ok(0)) => {
                        tracing::debug!("serial port closed");
                        return Err(Error::Io(io::Error::new(
                            io::ErrorKind::ConnectionReset,
                            "serial port closed",
                        )));
                    }
                    Ok(Ok(n)) => {
                        tracing::trace!("received {} bytes", n);
                        self.decoder.feed(&buf[..n]);
                        if let Some(line) = self.decoder.next_line() {
                            return Ok(Some(line));
                        }
                    }
                    Ok(Err(e)) => {
                        tracing::error!("serial read error: {}", e);
                        return Err(Error::Io(e));
                    }
                    Err(_) => return Ok(None),
                }
            }
        })
    }

    fn has_pending_data(&self) -> bool {
        if self.decoder.buffered() > 0 {
            return true;
        }
        self.stream
            .as_ref()
            .is_some_and(|stream| tokio_serial::SerialPort::bytes_to_read(stream).unwrap_or(0) > 0)
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn test_serial_config_builder() {
        let config = SerialConfig::new("/dev/ttyACM0")
            .baud_rate(9600)
            .read_timeout(Duration::from_secs(2));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_closed_transport_reports_not_open() {
        let transport = SerialTransport::with_port("/dev/ttyACM0");
        assert!(!transport.is_open());
        assert!(!transport.has_pending_data());
    }
}
