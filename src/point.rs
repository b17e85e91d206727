// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6371.0088;

/// Mean diameter of Earth, in kilometers.
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Single-precision geographic position.
///
/// No range validation is performed on construction. A point with non-finite
/// coordinates is considered invalid and is used to represent "no position yet".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLL {
    pub lat: f32,
    pub lng: f32,
}

impl PointLL {
    /// Point with unknown coordinates.
    pub const INVALID: Self = Self {
        lat: f32::NAN,
        lng: f32::NAN,
    };

    pub const fn new(lat: f32, lng: f32) -> Self {
        Self { lat, lng }
    }

    /// Returns true if both coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Calculates the great-circle distance to another point
    /// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
    /// Returns the result in kilometers.
    pub fn distance(&self, other: &PointLL) -> f32 {
        let lat1 = (self.lat as f64).to_radians();
        let lon1 = (self.lng as f64).to_radians();
        let lat2 = (other.lat as f64).to_radians();
        let lon2 = (other.lng as f64).to_radians();

        let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
        let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

        let h =
            sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

        (EARTH_DIAMETER * h.sqrt().asin()) as f32
    }
}

impl Default for PointLL {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-3),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn invalid_by_default() {
        assert!(!PointLL::default().is_valid());
        assert!(!PointLL::new(f32::NAN, 21.0).is_valid());
        assert!(!PointLL::new(52.0, f32::INFINITY).is_valid());
        assert!(PointLL::new(52.0, 21.0).is_valid());
    }

    #[test]
    fn no_range_validation() {
        let p = PointLL::new(123.0, -500.0);
        assert!(p.is_valid());
        assert_eq!(p.lat, 123.0);
        assert_eq!(p.lng, -500.0);
    }

    #[test]
    fn distance() {
        let centrum = PointLL::new(52.23024, 21.01062);
        let stadion = PointLL::new(52.23852, 21.0446);
        let falenica = PointLL::new(52.16125, 21.21147);

        assert_almost_eq!(centrum.distance(&stadion), 2.49049);
        assert_almost_eq!(centrum.distance(&falenica), 15.69248);
        assert_eq!(centrum.distance(&centrum), 0.0);
    }
}
