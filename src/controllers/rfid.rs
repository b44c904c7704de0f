//! Low-frequency RFID controller.
//!
//! Reads, emulates, and manages 125 kHz card keys stored on the
//! device. Keys live under the LF-RFID storage directory with a
//! `.rfid` extension; the device's storage is authoritative, nothing
//! is cached in-process.

use std::time::Duration;

use crate::client::FlipperZero;
use crate::controllers::{format_entry_path, parse_entries};
use crate::error::Result;
use crate::protocol::{command, response};
use crate::transport::Transport;

/// On-device application name.
const APP_NAME: &str = "lfrfid";

/// Settle delay after starting the LF-RFID app.
const APP_START_DELAY: Duration = Duration::from_secs(1);

/// Default on-device storage directory for RFID keys.
pub const DEFAULT_RFID_DIR: &str = "/ext/lfrfid";

/// File extension for stored keys.
pub const KEY_EXTENSION: &str = ".rfid";

/// Default budget for a card read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Card type used when the caller does not supply one.
const DEFAULT_CARD_TYPE: &str = "EM4100";

/// Card data to be written to device storage.
#[derive(Debug, Clone, Default)]
pub struct CardData {
    /// Card protocol type; defaults to EM4100 when absent.
    pub card_type: Option<String>,
    /// Card identifier. Saving requires a non-empty id.
    pub card_id: Option<String>,
}

/// Result of a card read attempt.
#[derive(Debug, Clone)]
pub struct CardRead {
    /// Whether a card was captured.
    pub success: bool,
    /// Card protocol type, when captured.
    pub card_type: Option<String>,
    /// Card identifier, when captured.
    pub card_id: Option<String>,
    /// Carrier frequency, when captured.
    pub frequency: Option<String>,
    /// Full response text, when a response was received.
    pub raw: Option<String>,
    /// Failure description, when not captured.
    pub error: Option<String>,
}

impl CardRead {
    fn failure(error: String, raw: Option<String>) -> Self {
        Self {
            success: false,
            card_type: None,
            card_id: None,
            frequency: None,
            raw,
            error: Some(error),
        }
    }
}

/// Controller for LF-RFID operations.
pub struct RfidController<'a, T> {
    flipper: &'a FlipperZero<T>,
    rfid_dir: String,
}

impl<'a, T: Transport> RfidController<'a, T> {
    /// Creates a controller bound to a connected session, using the
    /// default storage directory.
    #[must_use]
    pub fn new(flipper: &'a FlipperZero<T>) -> Self {
        Self::with_directory(flipper, DEFAULT_RFID_DIR)
    }

    /// Creates a controller with a custom storage directory.
    #[must_use]
    pub fn with_directory(flipper: &'a FlipperZero<T>, rfid_dir: impl Into<String>) -> Self {
        Self {
            flipper,
            rfid_dir: rfid_dir.into(),
        }
    }

    async fn ensure_app(&self) -> Result<()> {
        self.flipper.run_app(APP_NAME, APP_START_DELAY).await?;
        Ok(())
    }

    /// Lists stored RFID keys.
    ///
    /// Failures are logged and reported as an empty list.
    pub async fn list_keys(&self) -> Vec<String> {
        match self.list_keys_inner().await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("error listing RFID keys: {e}");
                Vec::new()
            }
        }
    }

    async fn list_keys_inner(&self) -> Result<Vec<String>> {
        self.ensure_app().await?;
        let resp = self
            .flipper
            .send_command(&command::storage_list(&self.rfid_dir))
            .await?;
        Ok(parse_entries(&resp, KEY_EXTENSION))
    }

    /// Reads a card held against the device.
    ///
    /// Waits up to `timeout` for a capture; card reads block on a
    /// physical card being presented, so budgets run long. The LF-RFID
    /// app is exited on every path, success or not, and all failures
    /// (timeout included) fold into the returned structure.
    pub async fn read_card(&self, timeout: Duration) -> CardRead {
        let result = self.read_card_inner(timeout).await;
        self.flipper.exit_app().await;
        result
    }

    async fn read_card_inner(&self, timeout: Duration) -> CardRead {
        if let Err(e) = self.ensure_app().await {
            return CardRead::failure(format!("error reading RFID card: {e}"), None);
        }

        match self
            .flipper
            .send_command_with_timeout(command::RFID_READ, timeout)
            .await
        {
            Ok(resp) => {
                if response::indicates(&resp, &["captured successfully"]) {
                    let fields = response::parse_fields(&resp);
                    CardRead {
                        success: true,
                        card_type: fields.get("Type").cloned(),
                        card_id: fields.get("ID").cloned(),
                        frequency: fields.get("Frequency").cloned(),
                        raw: Some(resp),
                        error: None,
                    }
                } else {
                    CardRead::failure("failed to read card".to_string(), Some(resp))
                }
            }
            Err(e) => CardRead::failure(format!("error reading RFID card: {e}"), None),
        }
    }

    /// Starts emulating a stored key.
    ///
    /// Emulation is open-ended: the device keeps emulating until the
    /// caller exits the app or disconnects, so this only reports
    /// whether emulation started. Failures are logged and reported as
    /// `false`.
    pub async fn emulate_card(&self, key_name: &str) -> bool {
        match self.emulate_card_inner(key_name).await {
            Ok(started) => started,
            Err(e) => {
                tracing::error!("error emulating RFID card: {e}");
                false
            }
        }
    }

    async fn emulate_card_inner(&self, key_name: &str) -> Result<bool> {
        let path = format_entry_path(key_name, &self.rfid_dir, KEY_EXTENSION);
        self.ensure_app().await?;

        let resp = self.flipper.send_command(&command::rfid_emulate(&path)).await?;
        let started = response::indicates(&resp, &["starting emulation", "emulating"]);
        if !started {
            tracing::warn!("failed to start emulation: {resp}");
        }
        Ok(started)
    }

    /// Saves card data to device storage under the given key name.
    ///
    /// A missing or empty card id short-circuits to `false` without
    /// touching the device. Failures are logged and reported as `false`.
    pub async fn save_card(&self, card: &CardData, key_name: &str) -> bool {
        let Some(card_id) = card.card_id.as_deref().filter(|id| !id.is_empty()) else {
            tracing::warn!("refusing to save card without an id");
            return false;
        };

        match self.save_card_inner(card, card_id, key_name).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!("error saving RFID card: {e}");
                false
            }
        }
    }

    async fn save_card_inner(&self, card: &CardData, card_id: &str, key_name: &str) -> Result<bool> {
        let card_type = card.card_type.as_deref().unwrap_or(DEFAULT_CARD_TYPE);
        let path = format_entry_path(key_name, &self.rfid_dir, KEY_EXTENSION);
        self.ensure_app().await?;

        let resp = self
            .flipper
            .send_command(&command::rfid_save(&path, card_type, card_id))
            .await?;
        let saved = response::indicates(&resp, &["saved successfully"]);
        if !saved {
            tracing::warn!("failed to save card: {resp}");
        }
        Ok(saved)
    }

    /// Deletes a stored key.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn delete_key(&self, key_name: &str) -> bool {
        match self.delete_key_inner(key_name).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!("error deleting RFID key: {e}");
                false
            }
        }
    }

    async fn delete_key_inner(&self, key_name: &str) -> Result<bool> {
        let path = format_entry_path(key_name, &self.rfid_dir, KEY_EXTENSION);
        self.ensure_app().await?;

        let resp = self.flipper.send_command(&command::storage_remove(&path)).await?;
        Ok(response::indicates(&resp, &["removed", "deleted"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockTransport, Reply};

    fn probe() -> Reply {
        Reply::lines(&["firmware: 1.2.3", "ok"])
    }

    fn app_started() -> Reply {
        Reply::lines(&["lfrfid app started", "ok"])
    }

    fn app_exited() -> Reply {
        Reply::lines(&["app exited", "ok"])
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_card_parses_capture() {
        let mock = MockTransport::new(vec![
            probe(),
            app_started(),
            Reply::lines(&[
                "RFID card captured successfully",
                "Type: EM4100",
                "ID: 01 02 03 04 05",
                "Frequency: 125 kHz",
                "ok",
            ]),
            app_exited(),
        ]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        let card = rfid.read_card(DEFAULT_READ_TIMEOUT).await;

        assert!(card.success);
        assert_eq!(card.card_type.as_deref(), Some("EM4100"));
        assert_eq!(card.card_id.as_deref(), Some("01 02 03 04 05"));
        assert_eq!(card.frequency.as_deref(), Some("125 kHz"));

        let written = writes.lock().unwrap();
        let exits = written.iter().filter(|cmd| *cmd == "app_exit").count();
        assert_eq!(exits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_card_timeout_still_exits_app() {
        let mock = MockTransport::new(vec![probe(), app_started(), Reply::Silence, app_exited()]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        let card = rfid.read_card(Duration::from_secs(1)).await;

        assert!(!card.success);
        assert!(card.error.unwrap().contains("timed out"));

        let written = writes.lock().unwrap();
        let exits = written.iter().filter(|cmd| *cmd == "app_exit").count();
        assert_eq!(exits, 1);
    }

    #[tokio::test]
    async fn test_save_card_requires_id() {
        let mock = MockTransport::new(vec![probe()]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        assert!(!rfid.save_card(&CardData::default(), "mykey").await);

        // Only the connect probe went out; no save command was sent.
        assert_eq!(writes.lock().unwrap().as_slice(), ["device_info"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_card_formats_command() {
        let mock = MockTransport::new(vec![
            probe(),
            app_started(),
            Reply::lines(&["card saved successfully", "ok"]),
        ]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let card = CardData {
            card_type: None,
            card_id: Some("0102030405".to_string()),
        };
        let rfid = RfidController::new(&flipper);
        assert!(rfid.save_card(&card, "mykey").await);

        let written = writes.lock().unwrap();
        assert_eq!(
            written.last().map(String::as_str),
            Some("rfid_save /ext/lfrfid/mykey.rfid EM4100 0102030405")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_emulate_card_formats_path() {
        let mock = MockTransport::new(vec![
            probe(),
            app_started(),
            Reply::lines(&["starting emulation", "ok"]),
        ]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        assert!(rfid.emulate_card("badge").await);

        let written = writes.lock().unwrap();
        assert_eq!(
            written.last().map(String::as_str),
            Some("rfid_emulate /ext/lfrfid/badge.rfid")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_keys_filters_extension() {
        let mock = MockTransport::new(vec![
            probe(),
            app_started(),
            Reply::lines(&["storage list /ext/lfrfid", "home.rfid", "notes.txt", "work.rfid", "ok"]),
        ]);
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        assert_eq!(
            rfid.list_keys().await,
            vec!["home.rfid".to_string(), "work.rfid".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_key() {
        let mock = MockTransport::new(vec![
            probe(),
            app_started(),
            Reply::lines(&["file removed", "ok"]),
        ]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let rfid = RfidController::new(&flipper);
        assert!(rfid.delete_key("old_badge").await);

        let written = writes.lock().unwrap();
        assert_eq!(
            written.last().map(String::as_str),
            Some("storage remove /ext/lfrfid/old_badge.rfid")
        );
    }
}
