//! Map view state: center, zoom level and viewport size.

use crate::geo::{project, unproject, LatLng, LatLngBounds, ScreenPoint};

/// Lowest zoom level the view accepts.
pub const MIN_ZOOM: f64 = 0.0;
/// Highest zoom level the view accepts.
pub const MAX_ZOOM: f64 = 18.0;
/// Fitted zoom levels are snapped down to multiples of this quantum.
pub const ZOOM_SNAP: f64 = 1.0;

/// Pixel padding applied when fitting the view to a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    /// Padding from the top-left viewport corner.
    pub top_left: ScreenPoint,
    /// Padding from the bottom-right viewport corner.
    pub bottom_right: ScreenPoint,
}

impl Padding {
    /// Creates padding from the two corner insets.
    pub fn new(top_left: ScreenPoint, bottom_right: ScreenPoint) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }
}

/// Position, zoom and pixel size of the currently displayed map area.
///
/// The view owns the Web Mercator arithmetic needed to answer "what is
/// visible" ([`MapView::bounds`]) and "how do I show this area"
/// ([`MapView::fit_bounds`]); it knows nothing about layers or rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: LatLng,
    zoom: f64,
    size: ScreenPoint,
}

impl MapView {
    /// Creates a view centered on `center` at `zoom`, for a viewport of
    /// `size` pixels.
    pub fn new(center: LatLng, zoom: f64, size: ScreenPoint) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
        }
    }

    /// Center of the view.
    pub fn center(&self) -> LatLng {
        self.center
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> ScreenPoint {
        self.size
    }

    /// Moves the view center, keeping the zoom level.
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Sets the zoom level, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Sets center and zoom in one step.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    /// Geographic rectangle currently covered by the viewport.
    pub fn bounds(&self) -> LatLngBounds {
        let center = project(self.center, self.zoom);
        let (half_x, half_y) = (self.size.x / 2.0, self.size.y / 2.0);
        LatLngBounds {
            south_west: unproject(
                ScreenPoint::new(center.x - half_x, center.y + half_y),
                self.zoom,
            ),
            north_east: unproject(
                ScreenPoint::new(center.x + half_x, center.y - half_y),
                self.zoom,
            ),
        }
    }

    /// Repositions the view so `bounds`, inset by `padding`, fills the
    /// viewport at the highest zoom level that still contains it.
    ///
    /// The zoom is snapped down to [`ZOOM_SNAP`] multiples. An asymmetric
    /// padding shifts the resulting center so the padded area, not the raw
    /// bounds, is what ends up centered.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Padding) {
        let north_west = project(
            LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
            0.0,
        );
        let south_east = project(
            LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
            0.0,
        );
        let extent_x = south_east.x - north_west.x;
        let extent_y = south_east.y - north_west.y;

        let avail_x = (self.size.x - padding.top_left.x - padding.bottom_right.x).max(0.0);
        let avail_y = (self.size.y - padding.top_left.y - padding.bottom_right.y).max(0.0);

        let ratio_x = if extent_x > 0.0 {
            avail_x / extent_x
        } else {
            f64::INFINITY
        };
        let ratio_y = if extent_y > 0.0 {
            avail_y / extent_y
        } else {
            f64::INFINITY
        };

        let ratio = ratio_x.min(ratio_y);
        let zoom = if ratio.is_finite() {
            ((ratio.log2() / ZOOM_SNAP).floor() * ZOOM_SNAP).clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            // Degenerate bounds (a single point) fit at any zoom.
            MAX_ZOOM
        };

        let south_west = project(bounds.south_west, zoom);
        let north_east = project(bounds.north_east, zoom);
        let offset = ScreenPoint::new(
            (padding.bottom_right.x - padding.top_left.x) / 2.0,
            (padding.bottom_right.y - padding.top_left.y) / 2.0,
        );
        let center_px = ScreenPoint::new(
            (south_west.x + north_east.x) / 2.0 + offset.x,
            (south_west.y + north_east.y) / 2.0 + offset.y,
        );

        self.set_view(unproject(center_px, zoom), zoom);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn view() -> MapView {
        MapView::new(
            LatLng::new(52.939534, -1.19708),
            14.0,
            ScreenPoint::new(360.0, 480.0),
        )
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = view();
        view.set_zoom(25.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.set_zoom(-3.0);
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn bounds_are_centered_on_view() {
        let view = view();
        let bounds = view.bounds();
        let center = bounds.center();
        assert_abs_diff_eq!(center.lng, view.center().lng, epsilon = 1e-9);
        // Mercator latitude is non-linear, so only the containment is exact.
        assert!(bounds.south_west.lat < view.center().lat);
        assert!(bounds.north_east.lat > view.center().lat);
    }

    #[test]
    fn fit_bounds_snaps_to_integer_zoom() {
        let mut view = view();
        let bounds = LatLngBounds {
            south_west: LatLng::new(50.0, -5.0),
            north_east: LatLng::new(55.0, 1.5),
        };
        view.fit_bounds(&bounds, Padding::default());

        assert_eq!(view.zoom() % ZOOM_SNAP, 0.0);
        // The fitted view must contain the requested bounds.
        let visible = view.bounds();
        assert!(visible.south_west.lat <= bounds.south_west.lat);
        assert!(visible.north_east.lat >= bounds.north_east.lat);
        assert!(visible.south_west.lng <= bounds.south_west.lng);
        assert!(visible.north_east.lng >= bounds.north_east.lng);
        // And one zoom level further in must not.
        view.set_view(bounds.center(), view.zoom() + ZOOM_SNAP);
        let zoomed = view.bounds();
        assert!(
            zoomed.south_west.lat > bounds.south_west.lat
                || zoomed.north_east.lat < bounds.north_east.lat
                || zoomed.south_west.lng > bounds.south_west.lng
                || zoomed.north_east.lng < bounds.north_east.lng
        );
    }

    #[test]
    fn fit_bounds_on_a_point_uses_max_zoom() {
        let mut view = view();
        let bounds = LatLngBounds::from_point(LatLng::new(52.0, -1.0));
        view.fit_bounds(&bounds, Padding::default());
        assert_eq!(view.zoom(), MAX_ZOOM);
        assert_abs_diff_eq!(view.center().lat, 52.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.center().lng, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn asymmetric_padding_shifts_the_center() {
        let mut symmetric = view();
        let mut padded = view();
        let bounds = LatLngBounds {
            south_west: LatLng::new(52.0, -1.5),
            north_east: LatLng::new(53.0, -0.5),
        };

        symmetric.fit_bounds(&bounds, Padding::default());
        padded.fit_bounds(
            &bounds,
            Padding::new(ScreenPoint::new(10.0, 10.0), ScreenPoint::new(25.0, 25.0)),
        );

        // Heavier bottom-right padding pushes the center south-east in pixel
        // space: larger x (east) and larger y (south).
        assert!(padded.center().lng > symmetric.center().lng);
        assert!(padded.center().lat < symmetric.center().lat);
    }
}
