//! Raster tile sources and the base tile layer.

use std::collections::HashMap;

use strfmt::FmtError;

/// Index of a tile in the `{z}/{x}/{y}` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// Column of the tile.
    pub x: i32,
    /// Row of the tile.
    pub y: i32,
    /// Zoom level of the tile.
    pub z: u32,
}

impl TileIndex {
    /// Creates a new tile index.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// A raster tile provider: a name, a URL template with `{z}`/`{x}`/`{y}`
/// placeholders, and the attribution text that must be displayed with its
/// tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// Identifier the source is selected by.
    pub name: String,
    /// URL template with `{z}`, `{x}` and `{y}` placeholders, in any order.
    pub url_template: String,
    /// Attribution text for the source.
    pub attribution: String,
}

impl TileSource {
    /// Resolves the URL of a single tile by expanding the template.
    pub fn tile_url(&self, index: TileIndex) -> Result<String, FmtError> {
        let mut vars = HashMap::new();
        vars.insert("z".to_owned(), index.z.to_string());
        vars.insert("x".to_owned(), index.x.to_string());
        vars.insert("y".to_owned(), index.y.to_string());
        strfmt::strfmt(&self.url_template, &vars)
    }
}

/// The static list of tile sources a map can switch between.
#[derive(Debug, Clone)]
pub struct TileSourceCatalog {
    sources: Vec<TileSource>,
}

impl TileSourceCatalog {
    /// Looks a source up by its identifier. Exact match, first match wins.
    pub fn get(&self, name: &str) -> Option<&TileSource> {
        self.sources.iter().find(|source| source.name == name)
    }

    /// All sources in the catalog.
    pub fn sources(&self) -> &[TileSource] {
        &self.sources
    }
}

impl Default for TileSourceCatalog {
    fn default() -> Self {
        Self {
            sources: vec![
                TileSource {
                    name: "esri".to_owned(),
                    url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}".to_owned(),
                    attribution: "Tiles &copy; Esri &mdash; Esri, DeLorme, NAVTEQ, TomTom, Intermap, iPC, USGS, FAO, NPS, NRCAN, GeoBase, Kadaster NL, Ordnance Survey, Esri Japan, METI, Esri China (Hong Kong), and the GIS User Community".to_owned(),
                },
                TileSource {
                    name: "nls".to_owned(),
                    url_template: "http://nls-0.tileserver.com/nls/{z}/{x}/{y}.jpg".to_owned(),
                    attribution: "Hostorical maps from 1919-1947 National Library Scotland".to_owned(),
                },
            ],
        }
    }
}

/// The base raster layer of a map. Owns the tile source it draws from; the
/// map replaces the whole layer when the base source changes.
#[derive(Debug, Clone)]
pub struct RasterTileLayer {
    source: TileSource,
}

impl RasterTileLayer {
    /// Creates a layer drawing from the given source.
    pub fn new(source: TileSource) -> Self {
        Self { source }
    }

    /// The source this layer draws from.
    pub fn source(&self) -> &TileSource {
        &self.source
    }

    /// Attribution text of the underlying source.
    pub fn attribution(&self) -> &str {
        &self.source.attribution
    }

    /// URL of a single tile of this layer.
    pub fn tile_url(&self, index: TileIndex) -> Result<String, FmtError> {
        self.source.tile_url(index)
    }
}
