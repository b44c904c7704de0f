//! # flipperzero-client
//!
//! A Rust client library for controlling Flipper Zero devices over USB/Serial.
//!
//! This library speaks the device's line-oriented CLI: commands go out as
//! newline-terminated text, responses come back as lines accumulated until a
//! terminal `ok`/`error` line.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - One lock-guarded session per serial port; commands never interleave
//! - Typed controllers for the IR, LF-RFID, and sub-GHz subsystems
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use flipperzero_client::{FlipperZero, IrController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), flipperzero_client::Error> {
//!     // Connect to a Flipper Zero device
//!     let flipper = FlipperZero::serial("/dev/ttyACM0");
//!     flipper.connect().await?;
//!
//!     println!("Firmware: {}", flipper.get_firmware_version().await?);
//!     println!("Battery: {}%", flipper.get_battery_level().await?);
//!
//!     // Drive a subsystem through its controller
//!     let ir = IrController::new(&flipper);
//!     for signal in ir.list_signals().await {
//!         println!("stored signal: {signal}");
//!     }
//!
//!     flipper.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`transport`] - Raw serial line I/O
//! - [`protocol`] - Command vocabulary, line decoding, response grammar
//! - [`client`] - The [`FlipperZero`] session owning the connection
//! - [`controllers`] - IR / RFID / sub-GHz domain controllers
//! - [`frequencies`] - Static sub-GHz frequency catalog

pub mod client;
pub mod controllers;
pub mod error;
pub mod frequencies;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use client::{DEFAULT_COMMAND_TIMEOUT, FlipperZero};
pub use controllers::{
    Capture, CardData, CardRead, IrController, RfidController, SubGhzController,
};
pub use error::{Error, Result};
pub use frequencies::{COMMON_FREQUENCIES, FrequencyDescriptor};
pub use transport::{SerialTransport, Transport, serial::SerialConfig};
