//! Infrared controller.
//!
//! Sends, records, and manages stored infrared signals. The CLI's IR
//! verbs operate on bare signal names; there is no file suffix
//! convention for this subsystem.

use std::time::Duration;

use crate::client::FlipperZero;
use crate::error::{Error, Result};
use crate::protocol::{command, response};
use crate::transport::Transport;

/// On-device application name.
const APP_NAME: &str = "IR";

/// Settle delay after starting the IR app.
const APP_START_DELAY: Duration = Duration::from_millis(500);

/// Default budget for a recording session.
pub const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(20);

/// Controller for infrared operations.
pub struct IrController<'a, T> {
    flipper: &'a FlipperZero<T>,
}

impl<'a, T: Transport> IrController<'a, T> {
    /// Creates a controller bound to a connected session.
    #[must_use]
    pub fn new(flipper: &'a FlipperZero<T>) -> Self {
        Self { flipper }
    }

    /// Starts the IR app before issuing a domain command.
    ///
    /// Unconditional per call: an external actor may have switched apps
    /// since the last operation, so cached state cannot be trusted.
    async fn ensure_app(&self) -> Result<()> {
        self.flipper.run_app(APP_NAME, APP_START_DELAY).await?;
        Ok(())
    }

    /// Sends a stored IR signal.
    ///
    /// Returns whether the device confirmed the transmission.
    ///
    /// # Errors
    ///
    /// Connection, timeout, and command failures propagate.
    pub async fn send_signal(&self, signal_name: &str) -> Result<bool> {
        self.ensure_app().await?;

        let resp = self.flipper.send_command(&command::ir_send(signal_name)).await?;
        tracing::info!("sent IR signal: {signal_name}");

        Ok(response::indicates(&resp, &["sent", "ok"]))
    }

    /// Records an IR signal under the given name.
    ///
    /// Recording waits for a button press on the remote being captured,
    /// so the budget is typically much longer than a normal command.
    ///
    /// # Errors
    ///
    /// On timeout, a best-effort cancel is issued before the timeout is
    /// re-raised so the device is not left in recording mode. Other
    /// failures propagate unchanged.
    pub async fn record_signal(&self, signal_name: &str, timeout: Duration) -> Result<bool> {
        self.ensure_app().await?;

        tracing::info!("recording IR signal as: {signal_name}");
        match self
            .flipper
            .send_command_with_timeout(&command::ir_record(signal_name), timeout)
            .await
        {
            Ok(resp) => Ok(response::indicates(&resp, &["recorded", "saved", "ok"])),
            Err(e @ Error::Timeout { .. }) => {
                tracing::error!("timeout while recording IR signal: {signal_name}");
                if let Err(cancel_err) = self.flipper.send_command(command::IR_RECORD_CANCEL).await
                {
                    tracing::error!("error cancelling recording: {cancel_err}");
                }
                Err(e)
            }
            Err(e) => {
                tracing::error!("error recording IR signal: {e}");
                Err(e)
            }
        }
    }

    /// Lists stored IR signals.
    ///
    /// Failures are logged and reported as an empty list.
    pub async fn list_signals(&self) -> Vec<String> {
        match self.list_signals_inner().await {
            Ok(signals) => signals,
            Err(e) => {
                tracing::error!("error listing IR signals: {e}");
                Vec::new()
            }
        }
    }

    async fn list_signals_inner(&self) -> Result<Vec<String>> {
        self.ensure_app().await?;
        let resp = self.flipper.send_command(command::IR_LIST).await?;
        Ok(parse_signal_list(&resp))
    }

    /// Deletes a stored IR signal.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn delete_signal(&self, signal_name: &str) -> bool {
        match self.delete_signal_inner(signal_name).await {
            Ok(deleted) => {
                if deleted {
                    tracing::info!("deleted IR signal: {signal_name}");
                }
                deleted
            }
            Err(e) => {
                tracing::error!("error deleting IR signal: {e}");
                false
            }
        }
    }

    async fn delete_signal_inner(&self, signal_name: &str) -> Result<bool> {
        self.ensure_app().await?;
        let resp = self.flipper.send_command(&command::ir_delete(signal_name)).await?;
        Ok(response::indicates(&resp, &["deleted", "ok"]))
    }

    /// Renames a stored IR signal.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn rename_signal(&self, old_name: &str, new_name: &str) -> bool {
        match self.rename_signal_inner(old_name, new_name).await {
            Ok(renamed) => {
                if renamed {
                    tracing::info!("renamed IR signal from {old_name} to {new_name}");
                }
                renamed
            }
            Err(e) => {
                tracing::error!("error renaming IR signal: {e}");
                false
            }
        }
    }

    async fn rename_signal_inner(&self, old_name: &str, new_name: &str) -> Result<bool> {
        self.ensure_app().await?;
        let resp = self
            .flipper
            .send_command(&command::ir_rename(old_name, new_name))
            .await?;
        Ok(response::indicates(&resp, &["renamed", "ok"]))
    }
}

/// Extracts signal names from an `ir_list` response.
///
/// The echoed command and the terminal status line are not entries.
fn parse_signal_list(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("ir_list")
                && !line.to_lowercase().starts_with("ok")
        })
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockTransport, Reply};

    fn app_started() -> Reply {
        Reply::lines(&["IR app started", "ok"])
    }

    async fn connected_session(mut script: Vec<Reply>) -> FlipperZero<MockTransport> {
        script.insert(0, Reply::lines(&["firmware: 1.2.3", "ok"]));
        let flipper = FlipperZero::with_transport(MockTransport::new(script));
        flipper.connect().await.unwrap();
        flipper
    }

    #[test]
    fn test_parse_signal_list_drops_echo_and_status() {
        let signals = parse_signal_list("ir_list\nremote1.ir\nremote2.ir\nok");
        assert_eq!(signals, vec!["remote1.ir".to_string(), "remote2.ir".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_signal() {
        let flipper = connected_session(vec![
            app_started(),
            Reply::lines(&["signal sent", "ok"]),
        ])
        .await;

        let ir = IrController::new(&flipper);
        assert!(ir.send_signal("tv_power").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_signals() {
        let flipper = connected_session(vec![
            app_started(),
            Reply::lines(&["ir_list", "remote1.ir", "remote2.ir", "ok"]),
        ])
        .await;

        let ir = IrController::new(&flipper);
        assert_eq!(
            ir.list_signals().await,
            vec!["remote1.ir".to_string(), "remote2.ir".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_timeout_cancels_recording() {
        let mock = MockTransport::new(vec![
            Reply::lines(&["firmware: 1.2.3", "ok"]),
            app_started(),
            Reply::Silence,
            Reply::lines(&["recording cancelled", "ok"]),
        ]);
        let writes = mock.writes_handle();
        let flipper = FlipperZero::with_transport(mock);
        flipper.connect().await.unwrap();

        let ir = IrController::new(&flipper);
        let err = ir
            .record_signal("ac_power", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));

        let written = writes.lock().unwrap();
        assert_eq!(written.last().map(String::as_str), Some("ir_record_cancel"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_signal_converts_errors() {
        let flipper = connected_session(vec![
            app_started(),
            Reply::lines(&["error: no such signal"]),
        ])
        .await;

        let ir = IrController::new(&flipper);
        assert!(!ir.delete_signal("missing").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rename_signal() {
        let flipper = connected_session(vec![
            app_started(),
            Reply::lines(&["signal renamed", "ok"]),
        ])
        .await;

        let ir = IrController::new(&flipper);
        assert!(ir.rename_signal("old", "new").await);
    }
}
