//! Main [`FlipperZero`] client implementation.
//!
//! This module provides the high-level [`FlipperZero`] session that
//! owns the serial transport, serializes command dispatch, and exposes
//! the device-level operations the subsystem controllers build on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::protocol::{command, response};
use crate::transport::{SerialTransport, Transport, serial::SerialConfig};

/// Default budget for a single command exchange.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between polls while waiting for response data.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Session for communicating with a Flipper Zero device.
///
/// Exactly one session should exist per physical port; controllers
/// share it by reference. At most one command is in flight at a time;
/// concurrent callers queue on the internal transport lock.
pub struct FlipperZero<T> {
    transport: Mutex<T>,
    command_timeout: Duration,
    connected: AtomicBool,
    last_response: RwLock<Option<String>>,
    last_error: RwLock<Option<String>>,
    active_app: RwLock<Option<String>>,
}

impl FlipperZero<SerialTransport> {
    /// Creates a new session for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyACM0")
    ///
    /// # Returns
    ///
    /// A new session (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a new session with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::with_transport(SerialTransport::new(config))
    }
}

impl<T: Transport> FlipperZero<T> {
    /// Creates a new session over the given transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            connected: AtomicBool::new(false),
            last_response: RwLock::new(None),
            last_error: RwLock::new(None),
            active_app: RwLock::new(None),
        }
    }

    /// Sets the default command timeout.
    pub fn set_command_timeout(&mut self, timeout: Duration) {
        self.command_timeout = timeout;
    }

    /// Connects to the device.
    ///
    /// Opens the transport and probes the link with a `device_info`
    /// query; a non-empty reply establishes the Connected state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the port cannot be opened or
    /// the probe fails; the session is left disconnected.
    pub async fn connect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;

        if let Err(e) = transport.open().await {
            drop(transport);
            return Err(self.fail_connect(format!("could not open serial port: {e}")).await);
        }

        // send_command is gated on the connected flag, so the probe
        // goes through the raw exchange.
        let probe = Self::exchange(&mut transport, command::DEVICE_INFO, self.command_timeout).await;
        match probe {
            Ok(info) if !info.is_empty() => {
                drop(transport);
                self.connected.store(true, Ordering::SeqCst);
                *self.last_response.write().await = Some(info);
                tracing::info!("connected to Flipper Zero");
                Ok(())
            }
            Ok(_) => {
                let _ = transport.close().await;
                drop(transport);
                Err(self.fail_connect("failed to get device info".to_string()).await)
            }
            Err(e) => {
                let _ = transport.close().await;
                drop(transport);
                Err(self.fail_connect(format!("failed to get device info: {e}")).await)
            }
        }
    }

    /// Disconnects from the device.
    ///
    /// Best-effort and idempotent: close failures are logged, never
    /// propagated, and the session always ends up disconnected.
    pub async fn disconnect(&self) {
        let result = {
            let mut transport = self.transport.lock().await;
            transport.close().await
        };
        self.connected.store(false, Ordering::SeqCst);
        self.active_app.write().await.take();
        match result {
            Ok(()) => tracing::info!("disconnected from Flipper Zero"),
            Err(e) => {
                tracing::error!("error disconnecting from Flipper Zero: {e}");
                *self.last_error.write().await = Some(e.to_string());
            }
        }
    }

    /// Returns true if connected.
    ///
    /// Checks both the session state and the transport handle; the port
    /// can be closed externally (device unplugged) without the session
    /// being notified.
    pub async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.transport.lock().await.is_open()
    }

    /// Reconnects if the session is not currently connected.
    ///
    /// Long-lived sessions call this before a batch of operations
    /// instead of reconnecting per request.
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.is_connected().await {
            return Ok(());
        }
        tracing::info!("session not connected, reconnecting");
        self.connect().await
    }

    /// Sends a command and waits for its response with the default timeout.
    ///
    /// See [`FlipperZero::send_command_with_timeout`].
    pub async fn send_command(&self, cmd: &str) -> Result<String> {
        self.send_command_with_timeout(cmd, self.command_timeout).await
    }

    /// Sends a command and accumulates its response.
    ///
    /// Lines are read until one starts with `ok` or `error`
    /// (case-insensitive) or the budget elapses. Response lines
    /// received before a mid-stream transport failure are discarded.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the session is disconnected; the
    ///   transport is not touched.
    /// - [`Error::Timeout`] if no line at all arrived in time; the
    ///   connection state is unchanged.
    /// - [`Error::Command`] if the response carries the error token;
    ///   the connection remains usable.
    /// - [`Error::Connection`] on a transport failure during the
    ///   exchange; the session is marked disconnected.
    pub async fn send_command_with_timeout(&self, cmd: &str, timeout: Duration) -> Result<String> {
        if !self.is_connected().await {
            return Err(Error::NotConnected);
        }

        let mut transport = self.transport.lock().await;
        match Self::exchange(&mut transport, cmd, timeout).await {
            Ok(resp) => {
                drop(transport);
                *self.last_response.write().await = Some(resp.clone());
                Ok(resp)
            }
            Err(e) if e.is_connection_error() => {
                drop(transport);
                self.connected.store(false, Ordering::SeqCst);
                let message = format!("serial communication error: {e}");
                tracing::error!("{message}");
                *self.last_error.write().await = Some(message.clone());
                Err(Error::Connection { message })
            }
            Err(e) => Err(e),
        }
    }

    /// Writes one command and frames its response.
    ///
    /// Callers hold the transport lock for the whole exchange; that
    /// lock is the session-wide critical section.
    async fn exchange(transport: &mut T, cmd: &str, timeout: Duration) -> Result<String> {
        transport.write_line(cmd).await?;

        let deadline = tokio::time::Instant::now() + timeout;
        let mut resp = String::new();

        while tokio::time::Instant::now() < deadline {
            if transport.has_pending_data() {
                if let Some(line) = transport.read_line().await? {
                    resp.push_str(&line);
                    resp.push('\n');
                    if response::is_terminal_line(&line) {
                        break;
                    }
                }
            } else {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        if resp.is_empty() {
            return Err(Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }

        let resp = resp.trim().to_string();
        if response::contains_error_token(&resp) {
            return Err(Error::Command { response: resp });
        }
        Ok(resp)
    }

    /// Starts an application on the device and waits for it to settle.
    ///
    /// The CLI acknowledges before the app is interactive and offers no
    /// ready handshake, so a fixed settle delay stands in for one.
    /// Returns whether the response indicated the app started.
    ///
    /// # Errors
    ///
    /// Command failures propagate; see [`FlipperZero::send_command`].
    pub async fn run_app(&self, name: &str, settle: Duration) -> Result<bool> {
        let resp = match self.send_command(&command::app_start(name)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("failed to start app {name}: {e}");
                return Err(e);
            }
        };

        tokio::time::sleep(settle).await;

        let started = response::indicates(&resp, &["started"]);
        if started {
            *self.active_app.write().await = Some(name.to_string());
        }
        Ok(started)
    }

    /// Exits the currently running application.
    ///
    /// Never fails: exit runs on cleanup paths where an error must not
    /// mask the caller's real outcome. Failures are logged and reported
    /// as `false`.
    pub async fn exit_app(&self) -> bool {
        match self.send_command(command::APP_EXIT).await {
            Ok(resp) => {
                self.active_app.write().await.take();
                response::indicates(&resp, &["exited"])
            }
            Err(e) => {
                tracing::error!("failed to exit app: {e}");
                false
            }
        }
    }

    /// Reboots the device.
    ///
    /// The link drops on reboot, so the session is forced into the
    /// disconnected state whatever the command outcome. Returns whether
    /// the reboot command itself was accepted.
    pub async fn restart(&self) -> bool {
        let result = self.send_command(command::REBOOT).await;
        self.disconnect().await;
        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("failed to restart Flipper Zero: {e}");
                false
            }
        }
    }

    // ==================== Derived Device Queries ====================

    /// Gets the device firmware version.
    ///
    /// Returns `"Unknown"` when the `device_info` response carries no
    /// firmware field.
    pub async fn get_firmware_version(&self) -> Result<String> {
        let resp = self.send_command(command::DEVICE_INFO).await?;
        Ok(response::firmware_version(&resp))
    }

    /// Gets the battery charge percentage.
    ///
    /// Parse failures degrade to 0 rather than erroring; only the
    /// command exchange itself can fail.
    pub async fn get_battery_level(&self) -> Result<u8> {
        let resp = self.send_command(command::POWER_INFO).await?;
        Ok(response::battery_percent(&resp))
    }

    /// Gets device information as a key/value map.
    ///
    /// Keys are lowercased; values are trimmed verbatim.
    pub async fn get_device_info(&self) -> Result<HashMap<String, String>> {
        let resp = self.send_command(command::DEVICE_INFO).await?;
        Ok(response::parse_fields(&resp)
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect())
    }

    // ==================== State Accessors ====================

    /// Returns the last successful response text, if any.
    pub async fn last_response(&self) -> Option<String> {
        self.last_response.read().await.clone()
    }

    /// Returns the last recorded error text, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Returns the on-device app believed to be running.
    ///
    /// This is a belief, not a guarantee: another process talking to
    /// the same device can change the running app without this session
    /// noticing.
    pub async fn active_app(&self) -> Option<String> {
        self.active_app.read().await.clone()
    }

    async fn fail_connect(&self, message: String) -> Error {
        self.connected.store(false, Ordering::SeqCst);
        tracing::error!("failed to connect to Flipper Zero: {message}");
        *self.last_error.write().await = Some(message.clone());
        Error::Connection { message }
    }
}
