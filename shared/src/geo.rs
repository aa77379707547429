use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
    #[error("position is not a finite number")]
    NonFinite,
}

/// A latitude/longitude pair known to be finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedCoordinate {
    lat: f64,
    lon: f64,
}

impl ValidatedCoordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }

    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        haversine_km(self, other)
    }

    /// `lat,lon` as used in map query strings.
    #[must_use]
    pub fn to_query_value(self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Great-circle distance in kilometres on a spherical earth.
#[must_use]
pub fn haversine_km(from: ValidatedCoordinate, to: ValidatedCoordinate) -> f64 {
    if from == to {
        return 0.0;
    }

    let (phi1, phi2) = (from.lat.to_radians(), to.lat.to_radians());
    let half_dphi = (to.lat - from.lat).to_radians() / 2.0;
    let half_dlambda = (to.lon - from.lon).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    // rounding can push `h` just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[must_use]
pub fn format_distance(km: f64) -> String {
    if !km.is_finite() || km < 0.0 {
        return "Unknown".to_string();
    }

    if km < 1.0 {
        #[allow(clippy::cast_possible_truncation)]
        let meters = (km * 1000.0).round() as i64;
        format!("{meters} m")
    } else {
        format!("{km:.1} km")
    }
}

/// Visible map area around a centre point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: ValidatedCoordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub const CLOSE_SPAN: f64 = 0.5;
    pub const WIDE_SPAN: f64 = 2.0;

    /// Zooms out when the user's position is known so both points have a chance to fit.
    #[must_use]
    pub fn around(center: ValidatedCoordinate, user_known: bool) -> Self {
        let span = if user_known {
            Self::WIDE_SPAN
        } else {
            Self::CLOSE_SPAN
        };
        Self {
            center,
            latitude_delta: span,
            longitude_delta: span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lon: f64) -> ValidatedCoordinate {
        ValidatedCoordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_canaveral_to_boca_chica() {
        let canaveral = coord(28.5618, -80.5772);
        let boca_chica = coord(25.9972, -97.1561);
        let d = haversine_km(canaveral, boca_chica);
        assert!((d - 1661.7).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_identical_points_are_zero() {
        let p = coord(34.632, -120.611);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let d = haversine_km(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        assert!(matches!(
            ValidatedCoordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            ValidatedCoordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
        assert_eq!(
            ValidatedCoordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NonFinite)
        );
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.4567), "457 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(1590.26), "1590.3 km");
        assert_eq!(format_distance(-1.0), "Unknown");
        assert_eq!(format_distance(f64::INFINITY), "Unknown");
    }

    #[test]
    fn test_map_region_span() {
        let pad = coord(28.608, -80.604);
        assert_eq!(MapRegion::around(pad, false).latitude_delta, 0.5);
        assert_eq!(MapRegion::around(pad, true).longitude_delta, 2.0);
    }

    fn any_coord() -> impl Strategy<Value = ValidatedCoordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| coord(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in any_coord(), b in any_coord()) {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_to_self_is_zero(a in any_coord()) {
            prop_assert_eq!(haversine_km(a, a), 0.0);
        }

        #[test]
        fn prop_distance_is_bounded(a in any_coord(), b in any_coord()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
