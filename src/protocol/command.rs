//! Command vocabulary for the Flipper Zero CLI.
//!
//! Commands are newline-terminated ASCII verbs, optionally followed by
//! space-separated arguments. This module centralizes every command the
//! library issues so controllers never format wire text themselves.

/// Queries device information.
pub const DEVICE_INFO: &str = "device_info";

/// Queries power/battery information.
pub const POWER_INFO: &str = "power info";

/// Exits the currently running on-device application.
pub const APP_EXIT: &str = "app_exit";

/// Reboots the device.
pub const REBOOT: &str = "reboot";

/// Lists stored infrared signals.
pub const IR_LIST: &str = "ir_list";

/// Cancels an in-progress infrared recording.
pub const IR_RECORD_CANCEL: &str = "ir_record_cancel";

/// Starts a low-frequency RFID card read.
pub const RFID_READ: &str = "rfid_read";

/// Starts an on-device application.
#[must_use]
pub fn app_start(name: &str) -> String {
    format!("app_start {name}")
}

/// Sends a stored infrared signal.
#[must_use]
pub fn ir_send(name: &str) -> String {
    format!("ir_send {name}")
}

/// Records an infrared signal under the given name.
#[must_use]
pub fn ir_record(name: &str) -> String {
    format!("ir_record {name}")
}

/// Deletes a stored infrared signal.
#[must_use]
pub fn ir_delete(name: &str) -> String {
    format!("ir_delete {name}")
}

/// Renames a stored infrared signal.
#[must_use]
pub fn ir_rename(old_name: &str, new_name: &str) -> String {
    format!("ir_rename {old_name} {new_name}")
}

/// Lists a storage directory.
#[must_use]
pub fn storage_list(dir: &str) -> String {
    format!("storage list {dir}")
}

/// Removes a file from device storage.
#[must_use]
pub fn storage_remove(path: &str) -> String {
    format!("storage remove {path}")
}

/// Emulates a stored RFID key.
#[must_use]
pub fn rfid_emulate(path: &str) -> String {
    format!("rfid_emulate {path}")
}

/// Saves RFID card data to device storage.
#[must_use]
pub fn rfid_save(path: &str, card_type: &str, card_id: &str) -> String {
    format!("rfid_save {path} {card_type} {card_id}")
}

/// Transmits a stored sub-GHz signal file.
#[must_use]
pub fn subghz_tx(path: &str) -> String {
    format!("subghz_tx {path}")
}

/// Captures sub-GHz traffic on a frequency into a file.
#[must_use]
pub fn subghz_rx(frequency: &str, path: &str) -> String {
    format!("subghz_rx {frequency} {path}")
}
