//! Bus stop types.

use std::fmt;

use super::Coordinate;

/// Error returned when parsing an invalid stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop code: {reason}")]
pub struct InvalidStopCode {
    reason: &'static str,
}

/// A unique bus stop code, as printed on the stop's signage and QR plate.
///
/// Codes are 1 to 32 ASCII characters, each alphanumeric or `-`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopCode(String);

impl StopCode {
    /// Maximum length of a stop code in bytes.
    const MAX_LEN: usize = 32;

    /// Parse a stop code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        if s.is_empty() {
            return Err(InvalidStopCode {
                reason: "must not be empty",
            });
        }
        if s.len() > Self::MAX_LEN {
            return Err(InvalidStopCode {
                reason: "must be at most 32 bytes",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(InvalidStopCode {
                reason: "must contain only ASCII letters, digits or '-'",
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bus stop at a fixed position.
///
/// Read-only input from the external store; the relay core never mutates
/// stops, it only ranks vehicles against them.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    code: StopCode,
    coordinate: Coordinate,
}

impl Stop {
    /// Create a stop from a validated code and position.
    pub fn new(code: StopCode, coordinate: Coordinate) -> Self {
        Self { code, coordinate }
    }

    /// The stop's unique code.
    pub fn code(&self) -> &StopCode {
        &self.code
    }

    /// The stop's position.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}
