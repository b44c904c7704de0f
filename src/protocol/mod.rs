//! Protocol definitions for the Flipper Zero CLI.
//!
//! This module contains the low-level protocol pieces:
//! - Incremental line decoding
//! - The textual command vocabulary
//! - Response framing predicates and field parsing

pub mod command;
pub mod line;
pub mod response;

pub use line::LineDecoder;
pub use response::{
    battery_percent, contains_error_token, firmware_version, indicates, is_terminal_line,
    parse_fields,
};
