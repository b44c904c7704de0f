//! Subsystem controllers for the Flipper Zero.
//!
//! Each controller is a thin domain layer over [`crate::FlipperZero`]:
//! it encodes domain verbs into CLI commands, makes sure the matching
//! on-device app is running first, and decodes the textual responses
//! into booleans or structured results. Controllers hold only a
//! reference to the shared session and are cheap to construct per call.

pub mod ir;
pub mod rfid;
pub mod subghz;

pub use ir::IrController;
pub use rfid::{CardData, CardRead, RfidController};
pub use subghz::{Capture, SubGhzController};

/// Normalizes a storage entry name into a fully-qualified device path.
///
/// Appends `extension` when absent and prefixes `dir` when the name
/// carries no path separator. Idempotent: formatting a formatted path
/// yields the same path.
pub(crate) fn format_entry_path(name: &str, dir: &str, extension: &str) -> String {
    let with_ext = if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{name}{extension}")
    };

    if with_ext.contains('/') {
        with_ext
    } else {
        format!("{dir}/{with_ext}")
    }
}

/// Extracts storage entries from a `storage list` response.
///
/// Keeps lines ending in `extension`, in input order; headers, the
/// echoed command, and the terminal status line all fall out.
pub(crate) fn parse_entries(response: &str, extension: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(extension))
        .map(ToString::to_string)
        .collect()
}
