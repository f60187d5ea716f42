//! Map layers: raster tile base layers, GeoJSON feature layers and the
//! county boundary overlay.

pub mod boundaries;
pub mod feature;
pub mod raster_tiles;

pub use boundaries::{BoundaryLayer, BoundaryLoader};
pub use feature::FeatureLayer;
pub use raster_tiles::{RasterTileLayer, TileIndex, TileSource, TileSourceCatalog};
