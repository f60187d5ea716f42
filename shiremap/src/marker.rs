//! Point markers and their popups.

use crate::geo::LatLng;
use crate::icon::Icon;

/// Zoom level the view moves to when a marker without an explicit zoom is
/// shown.
pub const DEFAULT_MARKER_ZOOM: f64 = 17.0;

/// Opaque handle to a registered marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub(crate) u64);

/// Options accepted when creating a marker.
#[derive(Debug, Clone, Default)]
pub struct MarkerOptions {
    /// Icon to render the marker with. `None` leaves the choice to the
    /// embedder's default marker style.
    pub icon: Option<Icon>,
    /// Zoom level used when the marker is shown. Defaults to
    /// [`DEFAULT_MARKER_ZOOM`].
    pub zoom: Option<f64>,
    /// Text for a popup bound to the marker. No popup is created without it.
    pub popup_text: Option<String>,
    /// Navigation target wired into the popup body. Only used together with
    /// `popup_text`.
    pub href: Option<String>,
}

/// A popup bound to a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// HTML body of the popup.
    pub html: String,
    /// Whether the popup shows a close button.
    pub close_button: bool,
    /// Whether the popup opens as soon as its layer is added.
    pub auto_open: bool,
}

/// A point annotation, optionally bound to a popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Geographic position of the marker.
    pub position: LatLng,
    /// Icon the marker is rendered with.
    pub icon: Option<Icon>,
    /// Zoom level the view moves to when this marker is shown.
    pub zoom: f64,
    /// Popup bound to the marker, if any.
    pub popup: Option<Popup>,
}

impl Marker {
    /// Creates a marker at `position` from the given options.
    ///
    /// When `popup_text` is set, the popup body is built from the popup
    /// template: an anchor wired to `href` when one is given, a plain span
    /// otherwise. Popups created here have no close button.
    pub fn new(position: LatLng, options: MarkerOptions) -> Self {
        let popup = options.popup_text.map(|text| Popup {
            html: popup_html(&text, options.href.as_deref()),
            close_button: false,
            auto_open: false,
        });

        Self {
            position,
            icon: options.icon,
            zoom: options.zoom.unwrap_or(DEFAULT_MARKER_ZOOM),
            popup,
        }
    }
}

/// Builds a popup body from the popup template.
pub fn popup_html(text: &str, href: Option<&str>) -> String {
    match href {
        Some(href) => {
            format!(r#"<a href="{href}"><span class="ui-btn-text">{text}</span></a>"#)
        }
        None => format!(r#"<span><span class="ui-btn-text">{text}</span></span>"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_body_uses_anchor_when_href_is_given() {
        let html = popup_html("Jubilee Campus", Some("/venue/jubilee"));
        assert_eq!(
            html,
            r#"<a href="/venue/jubilee"><span class="ui-btn-text">Jubilee Campus</span></a>"#
        );
    }

    #[test]
    fn popup_body_uses_span_without_href() {
        let html = popup_html("Lakeside", None);
        assert_eq!(
            html,
            r#"<span><span class="ui-btn-text">Lakeside</span></span>"#
        );
    }

    #[test]
    fn marker_defaults() {
        let marker = Marker::new(LatLng::new(52.0, -1.0), MarkerOptions::default());
        assert_eq!(marker.zoom, DEFAULT_MARKER_ZOOM);
        assert!(marker.popup.is_none());
        assert!(marker.icon.is_none());
    }

    #[test]
    fn marker_popup_has_no_close_button() {
        let marker = Marker::new(
            LatLng::new(52.0, -1.0),
            MarkerOptions {
                popup_text: Some("Main entrance".into()),
                ..Default::default()
            },
        );
        let popup = marker.popup.expect("popup was requested");
        assert!(!popup.close_button);
        assert!(!popup.auto_open);
        assert!(popup.html.contains("Main entrance"));
    }
}
