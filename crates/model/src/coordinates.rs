use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// `(0.0, 0.0)` is a valid position. An unknown position is expressed as
/// `Option::<Coordinates>::None`, never as a zeroed value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
