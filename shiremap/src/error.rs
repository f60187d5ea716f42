//! Error types returned by map operations.

use thiserror::Error;

use crate::geo::InvalidLatLng;
use crate::layer::boundaries::BoundaryLoadError;

/// Error from a map operation.
#[derive(Debug, Error)]
pub enum MapError {
    /// The given string is not a parseable `"lat,lng"` pair.
    #[error("invalid coordinate string: {0:?}")]
    InvalidCoordinates(String),

    /// No marker is registered under the given coordinate string.
    #[error("no marker registered at {0:?}")]
    UnknownMarker(String),

    /// The tile source catalog has no entry with the given name.
    #[error("unknown tile source: {0:?}")]
    UnknownTileSource(String),

    /// A tile URL template could not be expanded.
    #[error("malformed tile URL template")]
    TileTemplate(#[from] strfmt::FmtError),

    /// Loading the boundary dataset failed.
    #[error(transparent)]
    Boundary(#[from] BoundaryLoadError),

    /// An asynchronous result arrived after the owning view was destroyed or
    /// the target overlay removed, and was dropped.
    #[error("stale load token: the owning view state was reset")]
    Cancelled,
}

impl From<InvalidLatLng> for MapError {
    fn from(err: InvalidLatLng) -> Self {
        Self::InvalidCoordinates(err.0)
    }
}
