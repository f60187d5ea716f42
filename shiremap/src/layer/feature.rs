//! GeoJSON feature layer.

use geojson::{Feature, GeoJson, Value};
use serde_json::Value as JsonValue;

use crate::geo::{LatLng, LatLngBounds};
use crate::icon::Icon;
use crate::marker::{Marker, MarkerOptions, Popup};

/// A layer built from a GeoJSON document.
///
/// Point features become markers; every coordinate of every geometry
/// contributes to the layer bounds, which the map uses to fit its view.
#[derive(Debug, Clone, Default)]
pub struct FeatureLayer {
    markers: Vec<Marker>,
    bounds: Option<LatLngBounds>,
}

impl FeatureLayer {
    /// Builds a layer from a GeoJSON document.
    ///
    /// Accepts a feature collection, a single feature or a bare geometry.
    /// Each point feature is bound to a marker using `point_icon` and, when
    /// the feature carries an `html` property, a popup with that body. A
    /// truthy `open` property marks the popup to be opened immediately.
    pub fn from_geo_json(data: &GeoJson, point_icon: Option<Icon>) -> Self {
        let mut layer = Self::default();

        match data {
            GeoJson::FeatureCollection(collection) => {
                for feature in &collection.features {
                    layer.add_feature(feature, point_icon.as_ref());
                }
            }
            GeoJson::Feature(feature) => layer.add_feature(feature, point_icon.as_ref()),
            GeoJson::Geometry(geometry) => layer.extend_bounds(&geometry.value),
        }

        layer
    }

    /// Markers created for the layer's point features.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Geographic bounds covering every coordinate of the layer, or `None`
    /// for a layer without coordinates.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    fn add_feature(&mut self, feature: &Feature, point_icon: Option<&Icon>) {
        let Some(geometry) = &feature.geometry else {
            return;
        };

        self.extend_bounds(&geometry.value);

        if let Value::Point(position) = &geometry.value {
            let Some(position) = lat_lng(position) else {
                return;
            };

            let mut marker = Marker::new(
                position,
                MarkerOptions {
                    icon: point_icon.cloned(),
                    ..Default::default()
                },
            );

            let property = |key: &str| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|properties| properties.get(key))
            };
            if let Some(html) = property("html").and_then(JsonValue::as_str) {
                marker.popup = Some(Popup {
                    html: html.to_owned(),
                    close_button: true,
                    auto_open: property("open").is_some_and(is_truthy),
                });
            }

            self.markers.push(marker);
        }
    }

    fn extend_bounds(&mut self, value: &Value) {
        let mut points = Vec::new();
        collect_positions(value, &mut points);
        for point in points {
            match &mut self.bounds {
                Some(bounds) => bounds.extend(point),
                None => self.bounds = Some(LatLngBounds::from_point(point)),
            }
        }
    }
}

fn lat_lng(position: &[f64]) -> Option<LatLng> {
    // GeoJSON positions are [longitude, latitude].
    match position {
        [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
        _ => {
            log::warn!("skipping GeoJSON position with fewer than two components");
            None
        }
    }
}

fn collect_positions(value: &Value, out: &mut Vec<LatLng>) {
    match value {
        Value::Point(position) => out.extend(lat_lng(position)),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            out.extend(positions.iter().filter_map(|p| lat_lng(p)));
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            for line in lines {
                out.extend(line.iter().filter_map(|p| lat_lng(p)));
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    out.extend(ring.iter().filter_map(|p| lat_lng(p)));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_positions(&geometry.value, out);
            }
        }
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus_collection() -> GeoJson {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-1.1972, 52.9386]},
                    "properties": {"html": "<b>Trent Building</b>", "open": true}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-1.1870, 52.9530]},
                    "properties": {"html": "<b>Jubilee Campus</b>"}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-1.21, 52.93], [-1.18, 52.96]]
                    },
                    "properties": {}
                }
            ]
        }"#
        .parse()
        .expect("valid GeoJSON")
    }

    #[test]
    fn point_features_become_markers() {
        let layer = FeatureLayer::from_geo_json(&campus_collection(), Some(Icon::image("/i.png")));
        assert_eq!(layer.markers().len(), 2);

        let first = &layer.markers()[0];
        assert_eq!(first.position, LatLng::new(52.9386, -1.1972));
        let popup = first.popup.as_ref().expect("html property binds a popup");
        assert_eq!(popup.html, "<b>Trent Building</b>");
        assert!(popup.auto_open);
        assert!(popup.close_button);

        let second = &layer.markers()[1];
        assert!(!second.popup.as_ref().expect("popup").auto_open);
    }

    #[test]
    fn bounds_cover_all_geometries() {
        let layer = FeatureLayer::from_geo_json(&campus_collection(), None);
        let bounds = layer.bounds().expect("layer has coordinates");
        // The line string, not the markers, supplies three of the extremes.
        assert_eq!(bounds.south_west, LatLng::new(52.93, -1.21));
        assert_eq!(bounds.north_east, LatLng::new(52.96, -1.18));
    }

    #[test]
    fn empty_collection_has_no_bounds() {
        let empty: GeoJson = r#"{"type": "FeatureCollection", "features": []}"#
            .parse()
            .expect("valid GeoJSON");
        let layer = FeatureLayer::from_geo_json(&empty, None);
        assert!(layer.bounds().is_none());
        assert!(layer.markers().is_empty());
    }
}
