//! Drives the map engine headlessly: markers, a GeoJSON layer, tile
//! switching and a boundary overlay built from an inline dataset.

use shiremap::layer::boundaries::{BoundaryData, BoundaryLoadError, BoundaryLoader};
use shiremap::{MapBuilder, MarkerOptions};

struct InlineLoader(BoundaryData);

#[async_trait::async_trait]
impl BoundaryLoader for InlineLoader {
    async fn load(&self) -> Result<BoundaryData, BoundaryLoadError> {
        Ok(self.0.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut map = MapBuilder::default()
        .with_latlon(52.939534, -1.19708)
        .with_zoom(14.0)
        .build();

    println!(
        "map ready: center {}, zoom {}, base tiles {:?}",
        map.center(),
        map.zoom(),
        map.base_layer().map(|layer| layer.source().name.clone())
    );

    map.add_marker(
        "52.9386,-1.1972",
        MarkerOptions {
            popup_text: Some("Trent Building".into()),
            href: Some("/venue/trent".into()),
            ..Default::default()
        },
    )?;
    map.add_marker("52.9530,-1.1870", MarkerOptions::default())?;
    map.show_marker("52.9386,-1.1972")?;
    println!(
        "{} markers registered, active: {:?}",
        map.marker_count(),
        map.active_marker()
    );

    let campus: geojson::GeoJson = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-1.1972, 52.9386]},
                "properties": {"html": "<b>Trent Building</b>", "open": true}
            }
        ]
    }"#
    .parse()?;
    map.add_geo_json(&campus);
    println!("geojson layer added, zoom after fit: {}", map.zoom());

    let data: BoundaryData = serde_json::from_str(
        r#"{
            "0": {"name": "NT", "polygon": ["53.45,-1.2", "53.4,-0.7", "52.8,-0.75", "52.8,-1.3"]},
            "1": {"name": "DB", "polygon": ["53.5,-2.0", "53.4,-1.3", "52.85,-1.3", "52.9,-2.0"]}
        }"#,
    )?;
    map.add_boundaries(&InlineLoader(data)).await?;
    if let Some(layer) = map.boundaries() {
        for overlay in layer.overlays() {
            println!(
                "boundary {}: {} points, label at {}, link {:?}",
                overlay.name,
                overlay.polyline.points.len(),
                overlay.label.position,
                overlay.link
            );
        }
    }

    map.set_zoom(6.0);
    println!(
        "labels visible at zoom 6: {}",
        map.boundaries().map(|layer| layer.labels_visible()) == Some(true)
    );

    map.change_tiles("esri")?;
    println!(
        "base tiles switched to {:?}",
        map.base_layer().map(|layer| layer.source().name.clone())
    );

    map.remove_boundaries();
    map.destroy();
    println!("map destroyed, marker count: {}", map.marker_count());

    Ok(())
}
