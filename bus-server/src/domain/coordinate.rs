//! Geographic coordinate type.

use std::fmt;

/// Error returned when constructing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A validated geographic position in decimal degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180], and both
/// are finite. This type guarantees that any `Coordinate` value is valid
/// by construction.
///
/// # Examples
///
/// ```
/// use bus_server::domain::Coordinate;
///
/// let depot = Coordinate::new(51.5074, -0.1278).unwrap();
/// assert_eq!(depot.latitude(), 51.5074);
///
/// // Out-of-range latitude is rejected
/// assert!(Coordinate::new(95.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and construct a coordinate from decimal degrees.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate {
                reason: "latitude and longitude must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within [-90, 90] degrees",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within [-180, 180] degrees",
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_coordinates() {
        assert!(Coordinate::new(0.0, 0.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(51.5074, -0.1278).is_ok());
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(-90.0001, 0.0).is_err());
        assert!(Coordinate::new(95.0, 0.0).is_err());
    }

    #[test]
    fn rejects_longitude_out_of_range() {
        assert!(Coordinate::new(0.0, 180.0001).is_err());
        assert!(Coordinate::new(0.0, -180.0001).is_err());
        assert!(Coordinate::new(0.0, 360.0).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn accessors_return_inputs() {
        let c = Coordinate::new(10.5, -20.25).unwrap();
        assert_eq!(c.latitude(), 10.5);
        assert_eq!(c.longitude(), -20.25);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range pair constructs successfully.
        #[test]
        fn in_range_always_valid(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert!(Coordinate::new(lat, lon).is_ok());
        }

        /// Latitude outside the valid band is always rejected.
        #[test]
        fn out_of_range_latitude_rejected(lat in 90.0f64..1e6, lon in -180.0f64..=180.0) {
            prop_assume!(lat > 90.0);
            prop_assert!(Coordinate::new(lat, lon).is_err());
        }

        /// Longitude outside the valid band is always rejected.
        #[test]
        fn out_of_range_longitude_rejected(lat in -90.0f64..=90.0, lon in 180.0f64..1e6) {
            prop_assume!(lon > 180.0);
            prop_assert!(Coordinate::new(lat, lon).is_err());
        }
    }
}
