//! Geographic primitives: coordinates, bounds and the Web Mercator math the
//! view arithmetic is built on.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Size of a square map tile in pixels. All pixel-space math is derived from
/// the world size `TILE_SIZE * 2^zoom`.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude beyond which the Web Mercator projection is undefined. Points are
/// clamped to this value before projecting.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// A geographic point as a latitude/longitude pair in degrees.
///
/// No range checks are applied to either component; callers that need
/// validity beyond "finite number" must check themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Error returned when a `"lat,lng"` string cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid coordinate string: {0:?}")]
pub struct InvalidLatLng(pub String);

impl LatLng {
    /// Creates a point from latitude and longitude in degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for LatLng {
    type Err = InvalidLatLng;

    /// Parses a comma-delimited `"lat,lng"` string.
    ///
    /// The string is split on commas and the first two fields are used; any
    /// further fields are ignored. Both fields must parse as finite numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(',');
        let (Some(lat), Some(lng)) = (fields.next(), fields.next()) else {
            return Err(InvalidLatLng(s.to_owned()));
        };
        let lat: f64 = lat.trim().parse().map_err(|_| InvalidLatLng(s.to_owned()))?;
        let lng: f64 = lng.trim().parse().map_err(|_| InvalidLatLng(s.to_owned()))?;
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidLatLng(s.to_owned()));
        }
        Ok(Self { lat, lng })
    }
}

/// A point or extent in screen (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// Horizontal component in pixels.
    pub x: f64,
    /// Vertical component in pixels, growing downwards.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a screen point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned geographic rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Creates degenerate bounds containing a single point.
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Grows the bounds to contain the given point.
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Center of the rectangle.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Collects bounds over an iterator of points. `None` when it is empty.
    pub fn covering(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }
}

/// Projects a geographic point into world pixel coordinates at the given zoom
/// level. Latitude is clamped to [`MAX_LATITUDE`].
pub fn project(point: LatLng, zoom: f64) -> ScreenPoint {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = lat.to_radians().sin();
    ScreenPoint {
        x: (point.lng + 180.0) / 360.0 * scale,
        y: (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * std::f64::consts::PI)) * scale,
    }
}

/// Inverse of [`project`].
pub fn unproject(point: ScreenPoint, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let n = std::f64::consts::PI * (1.0 - 2.0 * point.y / scale);
    LatLng {
        lat: n.sinh().atan().to_degrees(),
        lng: point.x / scale * 360.0 - 180.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn parses_comma_delimited_pair() {
        let point: LatLng = "52.939534,-1.19708".parse().expect("valid string");
        assert_eq!(point, LatLng::new(52.939534, -1.19708));
    }

    #[test]
    fn parse_tolerates_whitespace_and_extra_fields() {
        let point: LatLng = " 52.0 , -1.0 ".parse().expect("whitespace is trimmed");
        assert_eq!(point, LatLng::new(52.0, -1.0));

        // Only the first two fields count.
        let point: LatLng = "1,2,3".parse().expect("extra fields are ignored");
        assert_eq!(point, LatLng::new(1.0, 2.0));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in ["", "52.0", "52.0,abc", "abc,-1.0", ",", "inf,0", "52.0,"] {
            assert!(bad.parse::<LatLng>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn project_round_trips() {
        let point = LatLng::new(52.939534, -1.19708);
        for zoom in [0.0, 7.0, 14.0] {
            let back = unproject(project(point, zoom), zoom);
            assert_abs_diff_eq!(back.lat, point.lat, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lng, point.lng, epsilon = 1e-9);
        }
    }

    #[test]
    fn projection_orientation() {
        // North maps to smaller y, east to larger x.
        let north = project(LatLng::new(60.0, 0.0), 0.0);
        let south = project(LatLng::new(-60.0, 0.0), 0.0);
        assert!(north.y < south.y);

        let west = project(LatLng::new(0.0, -60.0), 0.0);
        let east = project(LatLng::new(0.0, 60.0), 0.0);
        assert!(west.x < east.x);
    }

    #[test]
    fn bounds_extend_and_center() {
        let mut bounds = LatLngBounds::from_point(LatLng::new(52.0, -1.0));
        bounds.extend(LatLng::new(52.1, -1.1));
        bounds.extend(LatLng::new(52.0, -1.2));

        assert_eq!(bounds.south_west, LatLng::new(52.0, -1.2));
        assert_eq!(bounds.north_east, LatLng::new(52.1, -1.0));
        let center = bounds.center();
        assert_abs_diff_eq!(center.lat, 52.05, epsilon = 1e-12);
        assert_abs_diff_eq!(center.lng, -1.1, epsilon = 1e-12);
    }
}
