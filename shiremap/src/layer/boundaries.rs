//! County boundary overlay: polylines, zoom-dependent labels and the
//! asynchronous loader that fetches the boundary dataset.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::geo::{LatLng, LatLngBounds};
use crate::icon::Icon;
use crate::marker::{Marker, MarkerOptions};

/// Zoom level below which boundary labels are hidden.
pub const LABEL_MIN_ZOOM: f64 = 7.0;
/// CSS class applied to boundary label icons.
pub const LABEL_CLASS: &str = "county-icon";
/// Path prefix of the navigation target wired to a boundary label.
pub const BROWSE_PATH: &str = "../../browse/";

/// Stroke color of boundary polylines.
pub const BOUNDARY_COLOR: &str = "#51717F";
/// Stroke weight of boundary polylines, in pixels.
pub const BOUNDARY_WEIGHT: f64 = 4.0;
/// Fill color of boundary polylines.
pub const BOUNDARY_FILL_COLOR: &str = "#333";
/// Fill opacity of boundary polylines.
pub const BOUNDARY_FILL_OPACITY: f64 = 0.5;

/// A single region record of the boundary dataset: a county code and the
/// `"lat,lng"` strings of its outline.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryRecord {
    /// County code the region is labeled with.
    pub name: String,
    /// Outline of the region as an ordered list of `"lat,lng"` strings.
    pub polygon: Vec<String>,
}

/// The boundary dataset: a mapping from arbitrary keys to region records.
///
/// Keys are kept in sorted order so the produced overlay sequence is
/// deterministic regardless of the order the wire document used.
pub type BoundaryData = BTreeMap<String, BoundaryRecord>;

/// Error that can occur when trying to load the boundary dataset.
#[derive(Debug, Error)]
pub enum BoundaryLoadError {
    /// Could not connect to the remote server.
    #[error("could not reach the boundary data source")]
    Network,
    /// Failed to decode the boundary dataset from the response body.
    #[error("failed to decode boundary data")]
    Decoding,
}

/// Loader for the boundary dataset.
#[async_trait::async_trait]
pub trait BoundaryLoader: Send + Sync {
    /// Loads and decodes the dataset.
    async fn load(&self) -> Result<BoundaryData, BoundaryLoadError>;
}

/// Loads the boundary dataset from the Web.
///
/// Requests are sent with `Cache-Control: no-cache` so a republished dataset
/// is picked up immediately.
#[cfg(not(target_arch = "wasm32"))]
pub struct HttpBoundaryLoader {
    client: reqwest::Client,
    url: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpBoundaryLoader {
    /// Creates a loader fetching from the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Creates a loader reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait]
impl BoundaryLoader for HttpBoundaryLoader {
    async fn load(&self) -> Result<BoundaryData, BoundaryLoadError> {
        log::trace!("loading boundary data from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                log::error!("boundary request to {} failed: {err}", self.url);
                BoundaryLoadError::Network
            })?;

        let bytes = response.bytes().await.map_err(|err| {
            log::error!("reading boundary response from {} failed: {err}", self.url);
            BoundaryLoadError::Network
        })?;

        log::trace!("boundary data loaded, byte size: {}", bytes.len());

        serde_json::from_slice(&bytes).map_err(|err| {
            log::error!("decoding boundary data failed: {err}");
            BoundaryLoadError::Decoding
        })
    }
}

/// A styled polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Vertices of the line.
    pub points: Vec<LatLng>,
    /// Rendering style of the line.
    pub style: PathStyle,
}

impl Polyline {
    /// Bounding box of the line's vertices, or `None` for an empty line.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::covering(self.points.iter().copied())
    }
}

/// Rendering style of a vector path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    /// Stroke color.
    pub color: String,
    /// Stroke weight in pixels.
    pub weight: f64,
    /// Fill color.
    pub fill_color: String,
    /// Fill opacity.
    pub fill_opacity: f64,
}

impl Default for PathStyle {
    /// The boundary outline style.
    fn default() -> Self {
        Self {
            color: BOUNDARY_COLOR.to_owned(),
            weight: BOUNDARY_WEIGHT,
            fill_color: BOUNDARY_FILL_COLOR.to_owned(),
            fill_opacity: BOUNDARY_FILL_OPACITY,
        }
    }
}

/// One rendered region: its name, outline and label marker.
#[derive(Debug, Clone)]
pub struct BoundaryOverlay {
    /// County code of the region.
    pub name: String,
    /// Styled outline of the region.
    pub polyline: Polyline,
    /// Text-label marker placed at the outline's bounding-box center.
    pub label: Marker,
    /// Navigation target activated by the label, when the county code
    /// resolves through the code table.
    pub link: Option<String>,
}

/// The boundary overlay set. Populated wholesale from a dataset and removed
/// wholesale; label visibility follows the view's zoom level.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLayer {
    overlays: Vec<BoundaryOverlay>,
    labels_visible: bool,
}

impl BoundaryLayer {
    /// Builds the overlay set from a decoded dataset.
    ///
    /// Unparseable polygon points are skipped; a region without at least two
    /// valid points produces no overlay entry.
    pub fn from_data(data: &BoundaryData) -> Self {
        let mut overlays = Vec::with_capacity(data.len());

        for record in data.values() {
            let points: Vec<LatLng> = record
                .polygon
                .iter()
                .filter_map(|geo| match geo.parse() {
                    Ok(point) => Some(point),
                    Err(_) => {
                        log::warn!(
                            "skipping unparseable point {geo:?} in boundary {:?}",
                            record.name
                        );
                        None
                    }
                })
                .collect();

            if points.len() < 2 {
                log::warn!("boundary {:?} has no drawable outline", record.name);
                continue;
            }

            let polyline = Polyline {
                points,
                style: PathStyle::default(),
            };
            let Some(bounds) = polyline.bounds() else {
                continue;
            };

            let label = Marker::new(
                bounds.center(),
                MarkerOptions {
                    icon: Some(Icon::text(format!("{}&nbsp;", record.name), LABEL_CLASS)),
                    ..Default::default()
                },
            );

            let link = match shire_for_code(&record.name) {
                Some(shire) => Some(format!("{BROWSE_PATH}{shire}")),
                None => {
                    log::warn!("no county table entry for code {:?}", record.name);
                    None
                }
            };

            overlays.push(BoundaryOverlay {
                name: record.name.clone(),
                polyline,
                label,
                link,
            });
        }

        Self {
            overlays,
            labels_visible: true,
        }
    }

    /// The rendered regions, in dataset key order.
    pub fn overlays(&self) -> &[BoundaryOverlay] {
        &self.overlays
    }

    /// Whether the label markers are currently visible.
    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    /// Updates label visibility for the given zoom level. Labels are hidden
    /// below [`LABEL_MIN_ZOOM`]; only visibility changes, not geometry.
    pub fn sync_zoom(&mut self, zoom: f64) {
        self.labels_visible = zoom >= LABEL_MIN_ZOOM;
    }
}

struct County {
    code: &'static str,
    shire: &'static str,
}

const COUNTIES: [County; 37] = [
    County { code: "BD", shire: "Bedfordshire" },
    County { code: "BRK", shire: "Berkshire" },
    County { code: "BK", shire: "Buckinghamshire" },
    County { code: "C", shire: "Cambridgeshire" },
    County { code: "CH", shire: "Cheshire" },
    County { code: "CU", shire: "Cumberland" },
    County { code: "CO", shire: "Cornwall" },
    County { code: "D", shire: "Devon" },
    County { code: "DO", shire: "Dorset" },
    County { code: "DB", shire: "Derbyshire" },
    County { code: "DU", shire: "Durham" },
    County { code: "ES", shire: "Essex" },
    County { code: "GL", shire: "Gloucestershire" },
    County { code: "HMP", shire: "Hampshire" },
    County { code: "HU", shire: "Huntingdonshire" },
    County { code: "HRT", shire: "Hertfordshire" },
    County { code: "LEI", shire: "Leicestershire" },
    County { code: "L", shire: "Lincolnshire" },
    County { code: "LNC", shire: "Lancashire" },
    County { code: "MX", shire: "Middlesex" },
    County { code: "NF", shire: "Norfolk" },
    County { code: "NTH", shire: "Northamptonshire" },
    County { code: "NT", shire: "Nottinghamshire" },
    County { code: "O", shire: "Oxfordshire" },
    County { code: "RU", shire: "Rutland" },
    County { code: "SFK", shire: "Suffolk" },
    County { code: "SA", shire: "Shropshire" },
    County { code: "SX", shire: "Sussex" },
    County { code: "ST", shire: "Staffordshire" },
    County { code: "SR", shire: "Surrey" },
    County { code: "WA", shire: "Warwickshire" },
    County { code: "W", shire: "Wiltshire" },
    County { code: "WE", shire: "Westmorland" },
    County { code: "WO", shire: "Worcestershire" },
    County { code: "YE", shire: "East Riding of Yorkshire" },
    County { code: "YN", shire: "North Riding of Yorkshire" },
    County { code: "YW", shire: "West Riding of Yorkshire" },
];

/// Resolves a county code to its canonical long name. Exact-match,
/// case-sensitive, first match wins.
pub fn shire_for_code(code: &str) -> Option<&'static str> {
    COUNTIES
        .iter()
        .find(|county| county.code == code)
        .map(|county| county.shire)
}
