//! Response grammar for the Flipper Zero CLI.
//!
//! Responses are accumulated line by line until a terminal line is
//! seen. This module holds the framing predicates and the small
//! text parsers used by the derived device queries.

use std::collections::HashMap;

/// Returns true if the line ends a command's response.
///
/// A terminal line starts with `ok` or `error`, case-insensitively.
/// The line is expected to be pre-trimmed by the transport.
#[must_use]
pub fn is_terminal_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.starts_with("ok") || lower.starts_with("error")
}

/// Returns true if the accumulated response carries the error token
/// anywhere, case-insensitively.
///
/// The token wins even when an `ok` line appeared earlier in the same
/// response.
#[must_use]
pub fn contains_error_token(response: &str) -> bool {
    response.to_lowercase().contains("error")
}

/// Returns true if any of the expected keywords occurs in the
/// response, case-insensitively.
///
/// Absence of every keyword means the operation was declined, not that
/// the exchange failed.
#[must_use]
pub fn indicates(response: &str, keywords: &[&str]) -> bool {
    let lower = response.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword))
}

/// Parses colon-delimited `key: value` lines into a map.
///
/// Keys and values are trimmed; key case is preserved. Lines without a
/// colon are skipped.
#[must_use]
pub fn parse_fields(response: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in response.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    fields
}

/// Extracts the firmware version from a `device_info` response.
#[must_use]
pub fn firmware_version(response: &str) -> String {
    for line in response.lines() {
        if line.to_lowercase().contains("firmware:") {
            if let Some((_, value)) = line.split_once(':') {
                return value.trim().to_string();
            }
        }
    }
    "Unknown".to_string()
}

/// Extracts the battery percentage from a `power info` response.
///
/// Strips a trailing percent sign. Any parse failure degrades to 0;
/// this query is a best-effort enrichment, never a hard failure.
#[must_use]
pub fn battery_percent(response: &str) -> u8 {
    for line in response.lines() {
        if line.to_lowercase().contains("charge:") {
            if let Some((_, value)) = line.split_once(':') {
                return value.trim().trim_end_matches('%').parse().unwrap_or_else(|_| {
                    tracing::error!("failed to parse battery level from: {value}");
                    0
                });
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_line_detection() {
        assert!(is_terminal_line("ok"));
        assert!(is_terminal_line("OK: done"));
        assert!(is_terminal_line("error: not found"));
        assert!(is_terminal_line("Error"));
        assert!(!is_terminal_line("firmware: 1.2.3"));
        assert!(!is_terminal_line("ready"));
    }

    #[test]
    fn test_error_token_wins_over_ok() {
        let response = "ok\nerror: storage failure";
        assert!(contains_error_token(response));
    }

    #[test]
    fn test_indicates_is_case_insensitive() {
        assert!(indicates("Transmission Started", &["transmission started"]));
        assert!(indicates("signal sent\nok", &["sent", "ok"]));
        assert!(!indicates("nothing happened", &["sent", "ok"]));
    }

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields("Type: EM4100\nID: 01 02 03\nok");
        assert_eq!(fields.get("Type").map(String::as_str), Some("EM4100"));
        assert_eq!(fields.get("ID").map(String::as_str), Some("01 02 03"));
        assert!(!fields.contains_key("ok"));
    }

    #[test]
    fn test_firmware_version() {
        assert_eq!(firmware_version("firmware: 1.2.3\nok"), "1.2.3");
        assert_eq!(firmware_version("Firmware: 0.99.1"), "0.99.1");
        assert_eq!(firmware_version("hardware: rev C\nok"), "Unknown");
    }

    #[test]
    fn test_battery_percent() {
        assert_eq!(battery_percent("charge: 87%\nok"), 87);
        assert_eq!(battery_percent("Charge: 100"), 100);
        assert_eq!(battery_percent("charge: full\nok"), 0);
        assert_eq!(battery_percent("voltage: 4.1\nok"), 0);
    }
}
