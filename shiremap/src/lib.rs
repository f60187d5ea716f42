//! Shiremap is an embeddable campus and county map engine. It manages the
//! state an interactive map is made of (the view, point markers, GeoJSON
//! feature layers, raster tile sources and a county boundary overlay)
//! independently of any particular renderer or UI toolkit.
//!
//! # Quick start
//!
//! ```no_run
//! use shiremap::{MapBuilder, MarkerOptions};
//!
//! # fn main() -> Result<(), shiremap::MapError> {
//! // Build a map of the campus area with the default tile source attached.
//! let mut map = MapBuilder::default()
//!     .with_latlon(52.939534, -1.19708)
//!     .with_zoom(14.0)
//!     .build();
//!
//! // Register a marker and bring it into view.
//! map.add_marker(
//!     "52.9386,-1.1972",
//!     MarkerOptions {
//!         popup_text: Some("Trent Building".into()),
//!         ..Default::default()
//!     },
//! )?;
//! map.show_marker("52.9386,-1.1972")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Main components
//!
//! * [`Map`] holds all façade state and exposes the public operations:
//!   marker registry, active-marker handling, GeoJSON ingestion, base tile
//!   switching and the boundary overlay. Each instance is independent, so
//!   several maps can coexist in one process.
//! * [`MapView`] owns the view arithmetic: center, zoom, viewport bounds and
//!   bounds fitting in Web Mercator space.
//! * [`layer`] contains the layer types: [`layer::RasterTileLayer`] for base
//!   tiles, [`layer::FeatureLayer`] for GeoJSON data and
//!   [`layer::BoundaryLayer`] for the county boundary overlay with its
//!   zoom-dependent labels.
//!
//! The boundary dataset is fetched asynchronously through the
//! [`layer::BoundaryLoader`] seam; [`LoadToken`] ties the continuation to
//! the map's lifetime so results arriving after [`Map::destroy`] or
//! [`Map::remove_boundaries`] are dropped instead of mutating a torn-down
//! view.

pub mod error;
pub mod geo;
pub mod icon;
pub mod layer;
pub mod marker;

mod map;
mod view;

pub use error::MapError;
pub use geo::{LatLng, LatLngBounds, ScreenPoint};
pub use map::{
    EventCallback, ListenerId, LoadToken, Map, MapBuilder, MapEvent, MapOptions,
    DEFAULT_BASE_SOURCE, GEOJSON_MAX_ZOOM, STANDARD_ICON,
};
pub use marker::{Marker, MarkerId, MarkerOptions, Popup};
pub use view::{MapView, Padding};
