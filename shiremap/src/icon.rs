//! Marker icon descriptors.

use crate::geo::ScreenPoint;

/// Default pixel size of an image icon.
pub const ICON_SIZE: ScreenPoint = ScreenPoint { x: 32.0, y: 37.0 };
/// Default anchor (hot-spot) inside an image icon.
pub const ICON_ANCHOR: ScreenPoint = ScreenPoint { x: 16.0, y: 37.0 };
/// Default popup anchor relative to the icon anchor.
pub const POPUP_ANCHOR: ScreenPoint = ScreenPoint { x: 0.0, y: -30.0 };

/// Rendering-style descriptor for a marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// An image icon sourced from a URL.
    Image(ImageIcon),
    /// A text label icon carrying an HTML fragment and a CSS class.
    Text(TextIcon),
}

impl Icon {
    /// Creates an image icon with the default geometry.
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image(ImageIcon::new(url))
    }

    /// Creates a text label icon.
    pub fn text(html: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::Text(TextIcon {
            html: html.into(),
            class_name: class_name.into(),
        })
    }
}

/// An image icon and its pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageIcon {
    /// Source URL of the icon image.
    pub url: String,
    /// Rendered size in pixels.
    pub size: ScreenPoint,
    /// Hot-spot inside the icon, from its top-left corner.
    pub anchor: ScreenPoint,
    /// Popup attachment point relative to the hot-spot.
    pub popup_anchor: ScreenPoint,
}

impl ImageIcon {
    /// Creates an icon with the default size and anchors.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size: ICON_SIZE,
            anchor: ICON_ANCHOR,
            popup_anchor: POPUP_ANCHOR,
        }
    }
}

/// A text label rendered in place of an image, styled through a CSS class.
#[derive(Debug, Clone, PartialEq)]
pub struct TextIcon {
    /// HTML fragment shown as the label body.
    pub html: String,
    /// CSS class applied to the label element.
    pub class_name: String,
}
