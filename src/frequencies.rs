//! Static catalog of common sub-GHz frequencies.
//!
//! Reference data for callers picking a capture frequency; the values
//! are spelled exactly as the device CLI expects them.

/// A named radio frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyDescriptor {
    /// Frequency in MHz.
    pub mhz: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Common frequencies for various applications and regions.
pub const COMMON_FREQUENCIES: &[FrequencyDescriptor] = &[
    FrequencyDescriptor {
        mhz: "300.00",
        label: "300.00 MHz - Garage doors (US)",
    },
    FrequencyDescriptor {
        mhz: "315.00",
        label: "315.00 MHz - Automotive (US)",
    },
    FrequencyDescriptor {
        mhz: "390.00",
        label: "390.00 MHz - Automotive (US)",
    },
    FrequencyDescriptor {
        mhz: "433.92",
        label: "433.92 MHz - Common (EU/Asia/Australia)",
    },
    FrequencyDescriptor {
        mhz: "434.42",
        label: "434.42 MHz - Automotive (EU)",
    },
    FrequencyDescriptor {
        mhz: "434.77",
        label: "434.77 MHz - Automotive (EU)",
    },
    FrequencyDescriptor {
        mhz: "868.35",
        label: "868.35 MHz - Common (EU)",
    },
    FrequencyDescriptor {
        mhz: "915.00",
        label: "915.00 MHz - ISM band (US)",
    },
    FrequencyDescriptor {
        mhz: "925.00",
        label: "925.00 MHz - Doorbells (US)",
    },
];

/// Looks up a catalog entry by its MHz value.
#[must_use]
pub fn find(mhz: &str) -> Option<&'static FrequencyDescriptor> {
    COMMON_FREQUENCIES.iter().find(|f| f.mhz == mhz)
}
