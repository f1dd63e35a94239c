//! Vehicle identifier type.

use std::fmt;

/// Error returned when parsing an invalid vehicle id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid vehicle id: {reason}")]
pub struct InvalidVehicleId {
    reason: &'static str,
}

/// An opaque vehicle identifier, unique per vehicle.
///
/// Ids are supplied by callers (the fleet registry assigns them), not
/// generated here. Surrounding whitespace is trimmed; the trimmed id must
/// be non-empty, at most 64 bytes, and free of control characters.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(String);

impl VehicleId {
    /// Maximum length of a vehicle id in bytes.
    const MAX_LEN: usize = 64;

    /// Parse a vehicle id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidVehicleId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidVehicleId {
                reason: "must not be empty",
            });
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(InvalidVehicleId {
                reason: "must be at most 64 bytes",
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidVehicleId {
                reason: "must not contain control characters",
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VehicleId({})", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parsing a clean id preserves it exactly.
        #[test]
        fn roundtrip(s in "[A-Za-z0-9/-]{1,64}") {
            let id = VehicleId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Over-length ids are always rejected.
        #[test]
        fn too_long_rejected(s in "[A-Za-z0-9]{65,100}") {
            prop_assert!(VehicleId::parse(&s).is_err());
        }
    }
}
