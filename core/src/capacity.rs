//! Approximate QR version / capacity estimation
//!
//! The estimate is presentation-only: it never gates whether encoding
//! succeeds. True capacity depends on the encoding mode and error
//! correction level; this uses a fixed breakpoint table of approximate
//! alphanumeric capacities at medium error correction.

/// (version, approximate alphanumeric capacity at M error correction)
pub const VERSION_CAPACITIES: [(u32, usize); 7] = [
    (1, 25),
    (2, 47),
    (5, 255),
    (10, 859),
    (20, 2800),
    (25, 4350),
    (40, 7089),
];

/// Derived capacity figures for a formatted payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityEstimate {
    /// Length of the payload in characters
    pub length: usize,
    /// Estimated QR version from the breakpoint table
    pub version: u32,
    /// Share of the selected version's capacity used, in [0, 100]
    pub used_percent: f64,
}

impl CapacityEstimate {
    /// Estimate the version and usage for a formatted payload.
    ///
    /// Walks the table in ascending version order and selects the
    /// first version whose capacity covers the payload; payloads
    /// beyond the largest entry fall back to it (usage capped at 100).
    pub fn for_payload(payload: &str) -> Self {
        let length = payload.chars().count();

        let (version, capacity) = VERSION_CAPACITIES
            .iter()
            .copied()
            .find(|&(_, capacity)| length <= capacity)
            .unwrap_or(VERSION_CAPACITIES[VERSION_CAPACITIES.len() - 1]);

        let used_percent = (length as f64 / capacity as f64 * 100.0).min(100.0);

        Self {
            length,
            version,
            used_percent,
        }
    }
}

impl std::fmt::Display for CapacityEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Data: {} chars - QR Version ~{} - Usage: {:.1}%",
            self.length, self.version, self.used_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payload_is_version_1() {
        let est = CapacityEstimate::for_payload("hello");
        assert_eq!(est.version, 1);
        assert_eq!(est.length, 5);
        assert!((est.used_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakpoint_boundaries() {
        assert_eq!(CapacityEstimate::for_payload(&"x".repeat(25)).version, 1);
        assert_eq!(CapacityEstimate::for_payload(&"x".repeat(26)).version, 2);
        assert_eq!(CapacityEstimate::for_payload(&"x".repeat(47)).version, 2);
        assert_eq!(CapacityEstimate::for_payload(&"x".repeat(48)).version, 5);
        assert_eq!(CapacityEstimate::for_payload(&"x".repeat(2800)).version, 20);
    }

    #[test]
    fn test_max_breakpoint_is_full() {
        let est = CapacityEstimate::for_payload(&"x".repeat(7089));
        assert_eq!(est.version, 40);
        assert_eq!(est.used_percent, 100.0);
    }

    #[test]
    fn test_oversized_payload_falls_back_to_max() {
        let est = CapacityEstimate::for_payload(&"x".repeat(9000));
        assert_eq!(est.version, 40);
        assert_eq!(est.used_percent, 100.0);
    }

    #[test]
    fn test_version_is_monotonic_in_length() {
        let mut last = 0;
        for len in [0, 1, 25, 26, 100, 255, 500, 859, 1000, 2800, 4000, 4350, 7089, 8000] {
            let est = CapacityEstimate::for_payload(&"x".repeat(len));
            assert!(est.version >= last, "version shrank at length {}", len);
            last = est.version;
        }
    }

    #[test]
    fn test_display_format() {
        let est = CapacityEstimate::for_payload("hello");
        assert_eq!(
            est.to_string(),
            "Data: 5 chars - QR Version ~1 - Usage: 20.0%"
        );
    }

    #[test]
    fn test_empty_payload() {
        let est = CapacityEstimate::for_payload("");
        assert_eq!(est.version, 1);
        assert_eq!(est.used_percent, 0.0);
    }
}
