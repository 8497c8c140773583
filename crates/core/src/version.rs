//! Major.minor parsing for WordPress version strings.
//!
//! Plugins declare compatibility as `major.minor` ("Tested up to: 6.4"), so
//! comparisons work segment by segment. Parsing the whole string as a float
//! would rank "6.10" below "6.9".

use std::fmt;

/// Placeholder used when the current platform version could not be fetched.
pub const UNKNOWN_PLATFORM_VERSION: &str = "Unknown";

/// The first two numeric segments of a dotted version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MajorMinor {
    pub major: u32,
    pub minor: u32,
}

impl MajorMinor {
    /// Parse `"6.4"`, `"6.4.2"`, or `"6"` (minor defaults to `0`).
    ///
    /// Returns `None` when the major segment is not a number, which covers
    /// the [`UNKNOWN_PLATFORM_VERSION`] placeholder.
    pub fn parse(version: &str) -> Option<Self> {
        let mut segments = version.trim().split('.');
        let major = segments.next()?.trim().parse().ok()?;
        let minor = match segments.next() {
            Some(s) => s.trim().parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for MajorMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
