//! Sub-GHz radio controller.
//!
//! Transmits and captures sub-GHz signal files stored on the device
//! under the sub-GHz storage directory with a `.sub` extension.

use std::time::Duration;

use crate::client::FlipperZero;
use crate::controllers::{format_entry_path, parse_entries};
use crate::error::Result;
use crate::frequencies::{self, FrequencyDescriptor};
use crate::protocol::{command, response};
use crate::transport::Transport;

/// On-device application name.
const APP_NAME: &str = "subghz";

/// Settle delay after starting the sub-GHz app.
const APP_START_DELAY: Duration = Duration::from_secs(1);

/// Default on-device storage directory for sub-GHz files.
pub const DEFAULT_SUBGHZ_DIR: &str = "/ext/subghz";

/// File extension for stored signal files.
pub const FILE_EXTENSION: &str = ".sub";

/// Default budget for a capture session.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a capture attempt.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Whether a signal was captured.
    pub success: bool,
    /// Frequency listened on, in MHz.
    pub frequency: String,
    /// Fully-qualified capture file path on the device.
    pub file: String,
    /// Full response text, when a response was received.
    pub raw: Option<String>,
    /// Failure description, when nothing was captured.
    pub error: Option<String>,
}

/// Controller for sub-GHz operations.
pub struct SubGhzController<'a, T> {
    flipper: &'a FlipperZero<T>,
    subghz_dir: String,
}

impl<'a, T: Transport> SubGhzController<'a, T> {
    /// Creates a controller bound to a connected session, using the
    /// default storage directory.
    #[must_use]
    pub fn new(flipper: &'a FlipperZero<T>) -> Self {
        Self::with_directory(flipper, DEFAULT_SUBGHZ_DIR)
    }

    /// Creates a controller with a custom storage directory.
    #[must_use]
    pub fn with_directory(flipper: &'a FlipperZero<T>, subghz_dir: impl Into<String>) -> Self {
        Self {
            flipper,
            subghz_dir: subghz_dir.into(),
        }
    }

    async fn ensure_app(&self) -> Result<()> {
        self.flipper.run_app(APP_NAME, APP_START_DELAY).await?;
        Ok(())
    }

    /// Lists stored sub-GHz signal files.
    ///
    /// Failures are logged and reported as an empty list.
    pub async fn list_files(&self) -> Vec<String> {
        match self.list_files_inner().await {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("error listing sub-GHz files: {e}");
                Vec::new()
            }
        }
    }

    async fn list_files_inner(&self) -> Result<Vec<String>> {
        self.ensure_app().await?;
        let resp = self
            .flipper
            .send_command(&command::storage_list(&self.subghz_dir))
            .await?;
        Ok(parse_entries(&resp, FILE_EXTENSION))
    }

    /// Transmits a stored signal file.
    ///
    /// The sub-GHz app is exited on every path. Failures are logged and
    /// reported as `false`.
    pub async fn transmit(&self, file_name: &str) -> bool {
        let result = self.transmit_inner(file_name).await;
        self.flipper.exit_app().await;
        match result {
            Ok(started) => started,
            Err(e) => {
                tracing::error!("error transmitting sub-GHz signal: {e}");
                false
            }
        }
    }

    async fn transmit_inner(&self, file_name: &str) -> Result<bool> {
        let path = format_entry_path(file_name, &self.subghz_dir, FILE_EXTENSION);
        self.ensure_app().await?;

        let resp = self.flipper.send_command(&command::subghz_tx(&path)).await?;
        let started = response::indicates(&resp, &["transmission started", "transmitting"]);
        if !started {
            tracing::warn!("failed to start transmission: {resp}");
        }
        Ok(started)
    }

    /// Captures traffic on a frequency into a file.
    ///
    /// When no file name is given, a timestamped capture name is
    /// generated. Capture blocks until a signal arrives or `timeout`
    /// elapses. The sub-GHz app is exited on every path, and all
    /// failures (timeout included) fold into the returned structure.
    pub async fn receive(
        &self,
        frequency: &str,
        timeout: Duration,
        file_name: Option<&str>,
    ) -> Capture {
        let name = file_name.map_or_else(generate_capture_name, ToString::to_string);
        let path = format_entry_path(&name, &self.subghz_dir, FILE_EXTENSION);

        let result = self.receive_inner(frequency, timeout, &path).await;
        self.flipper.exit_app().await;
        result.unwrap_or_else(|e| Capture {
            success: false,
            frequency: frequency.to_string(),
            file: path,
            raw: None,
            error: Some(format!("error receiving sub-GHz signal: {e}")),
        })
    }

    async fn receive_inner(
        &self,
        frequency: &str,
        timeout: Duration,
        path: &str,
    ) -> Result<Capture> {
        self.ensure_app().await?;

        let resp = self
            .flipper
            .send_command_with_timeout(&command::subghz_rx(frequency, path), timeout)
            .await?;

        if response::indicates(&resp, &["captured", "received"]) {
            Ok(Capture {
                success: true,
                frequency: frequency.to_string(),
                file: path.to_string(),
                raw: Some(resp),
                error: None,
            })
        } else {
            Ok(Capture {
                success: false,
                frequency: frequency.to_string(),
                file: path.to_string(),
                raw: Some(resp),
                error: Some("no signal captured".to_string()),
            })
        }
    }

    /// Deletes a stored signal file.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn delete_file(&self, file_name: &str) -> bool {
        match self.delete_file_inner(file_name).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!("error deleting sub-GHz file: {e}");
                false
            }
        }
    }

    async fn delete_file_inner(&self, file_name: &str) -> Result<bool> {
        let path = format_entry_path(file_name, &self.subghz_dir, FILE_EXTENSION);
        self.ensure_app().await?;

        let resp = self.flipper.send_command(&command::storage_remove(&path)).await?;
        Ok(response::indicates(&resp, &["removed", "deleted"]))
    }

    /// Returns the static catalog of common frequencies.
    ///
    /// Pure reference data; no device interaction.
    #[must_use]
    pub fn get_common_frequencies(&self) -> &'static [FrequencyDescriptor] {
        frequencies::COMMON_FREQUENCIES
    }
}

/// Generates a timestamped capture file name.
fn generate_capture_name() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("captured_{timestamp}")
}
