//! The map façade: view state, marker registry, layers and events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use geojson::GeoJson;

use crate::error::MapError;
use crate::geo::{LatLng, LatLngBounds, ScreenPoint};
use crate::icon::Icon;
use crate::layer::boundaries::{BoundaryData, BoundaryLayer, BoundaryLoader};
use crate::layer::feature::FeatureLayer;
use crate::layer::raster_tiles::{RasterTileLayer, TileSourceCatalog};
use crate::marker::{Marker, MarkerId, MarkerOptions};
use crate::view::{MapView, Padding};

/// Name of the tile source attached as the base layer by [`Map::init`].
pub const DEFAULT_BASE_SOURCE: &str = "nls";
/// Logical name of the icon used for GeoJSON point features.
pub const STANDARD_ICON: &str = "standard";
/// Zoom ceiling applied after fitting the view to a GeoJSON layer.
pub const GEOJSON_MAX_ZOOM: f64 = 13.0;

/// Notification emitted by the map to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Initialization completed.
    Loaded,
    /// The view center or zoom changed.
    ViewChanged {
        /// New view center.
        center: LatLng,
        /// New zoom level.
        zoom: f64,
    },
    /// A zoom change finished.
    ZoomEnd {
        /// New zoom level.
        zoom: f64,
    },
}

/// Callback invoked for every emitted [`MapEvent`].
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Handle to a registered event listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Token guarding the continuation of an asynchronous load against the
/// owning map being reset in the meantime.
///
/// A token snapshots the map's load epoch; [`Map::destroy`],
/// [`Map::remove_boundaries`] and a repeated [`Map::init`] advance the
/// epoch, invalidating every token handed out before.
#[derive(Debug, Clone)]
pub struct LoadToken {
    epoch: u64,
    shared: Arc<AtomicU64>,
}

impl LoadToken {
    /// Whether the result of the guarded operation may still be applied.
    pub fn is_valid(&self) -> bool {
        self.shared.load(Ordering::SeqCst) == self.epoch
    }
}

/// Configuration accepted by [`MapBuilder`]; caller-supplied values are
/// merged over these defaults.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Initial zoom level.
    pub zoom: f64,
    /// Identifier of the page element embedding the map.
    pub container: String,
    /// Initial view center.
    pub center: LatLng,
    /// Identifier of the base map style. Adjusted for high-density displays
    /// at init time.
    pub style_id: String,
    /// Device pixel ratio of the display. Ratios of 2 and above select the
    /// high-density style variant.
    pub pixel_ratio: f64,
    /// Mapping from logical icon name to image URL.
    pub icon_urls: AHashMap<String, String>,
    /// Viewport size in pixels.
    pub size: ScreenPoint,
}

impl Default for MapOptions {
    fn default() -> Self {
        let mut icon_urls = AHashMap::new();
        icon_urls.insert(
            STANDARD_ICON.to_owned(),
            "/img/marker_main_sml_red.png".to_owned(),
        );
        Self {
            zoom: 14.0,
            container: "map".to_owned(),
            center: LatLng::new(52.939534, -1.19708),
            style_id: "52661".to_owned(),
            pixel_ratio: 1.0,
            icon_urls,
            size: ScreenPoint::new(360.0, 480.0),
        }
    }
}

/// Builder for [`Map`].
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    options: MapOptions,
}

impl MapBuilder {
    /// Sets the initial view center.
    pub fn with_latlon(mut self, lat: f64, lng: f64) -> Self {
        self.options.center = LatLng::new(lat, lng);
        self
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.options.zoom = zoom;
        self
    }

    /// Sets the identifier of the embedding page element.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.options.container = container.into();
        self
    }

    /// Sets the base map style identifier.
    pub fn with_style_id(mut self, style_id: impl Into<String>) -> Self {
        self.options.style_id = style_id.into();
        self
    }

    /// Sets the device pixel ratio of the target display.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.options.pixel_ratio = pixel_ratio;
        self
    }

    /// Adds or replaces an icon URL under a logical name.
    pub fn with_icon_url(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.options.icon_urls.insert(name.into(), url.into());
        self
    }

    /// Sets the viewport size in pixels.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.options.size = ScreenPoint::new(width, height);
        self
    }

    /// Builds and initializes the map.
    pub fn build(self) -> Map {
        let mut map = Map::new(self.options);
        map.init();
        map
    }
}

/// An embeddable interactive map.
///
/// A `Map` owns all façade state: the view, the marker registry with its
/// single active marker, the base tile layer, GeoJSON feature layers, the
/// boundary overlay and the event listeners. Every instance is independent;
/// nothing is shared between maps.
pub struct Map {
    options: MapOptions,
    container: String,
    style_id: String,
    icons: AHashMap<String, Icon>,
    view: MapView,
    tile_sources: TileSourceCatalog,
    base_layer: Option<RasterTileLayer>,
    marker_keys: AHashMap<String, MarkerId>,
    markers: AHashMap<MarkerId, Marker>,
    next_marker_id: u64,
    active_marker: Option<MarkerId>,
    feature_layers: Vec<FeatureLayer>,
    boundaries: Option<BoundaryLayer>,
    listeners: Vec<(ListenerId, EventCallback)>,
    next_listener_id: u64,
    load_epoch: Arc<AtomicU64>,
}

impl Map {
    /// Creates an uninitialized map from the given options. Most callers
    /// should use [`MapBuilder::build`], which also runs [`Map::init`].
    pub fn new(options: MapOptions) -> Self {
        let view = MapView::new(options.center, options.zoom, options.size);
        Self {
            container: format!("#{}", options.container),
            style_id: options.style_id.clone(),
            icons: AHashMap::new(),
            view,
            tile_sources: TileSourceCatalog::default(),
            base_layer: None,
            marker_keys: AHashMap::new(),
            markers: AHashMap::new(),
            next_marker_id: 0,
            active_marker: None,
            feature_layers: Vec::new(),
            boundaries: None,
            listeners: Vec::new(),
            next_listener_id: 0,
            load_epoch: Arc::new(AtomicU64::new(0)),
            options,
        }
    }

    /// Initializes the map: builds the icon registry, attaches the default
    /// base tile layer, sets the initial view and emits [`MapEvent::Loaded`].
    ///
    /// Calling `init` again replaces prior state, including anything loaded
    /// asynchronously in the meantime.
    pub fn init(&mut self) {
        self.invalidate_loads();

        self.style_id = self.options.style_id.clone();
        if self.options.pixel_ratio >= 2.0 {
            self.style_id.push_str("@2x");
        }

        self.icons = self
            .options
            .icon_urls
            .iter()
            .map(|(name, url)| (name.clone(), Icon::image(url.clone())))
            .collect();

        self.container = format!("#{}", self.options.container);
        self.base_layer = self
            .tile_sources
            .get(DEFAULT_BASE_SOURCE)
            .cloned()
            .map(RasterTileLayer::new);
        self.view = MapView::new(self.options.center, self.options.zoom, self.options.size);

        log::info!(
            "map initialized in container {} at {} (zoom {})",
            self.container,
            self.options.center,
            self.options.zoom
        );
        self.fire(&MapEvent::Loaded);
    }

    /// Tears the map down: discards the view state and resets every
    /// container field, so [`Map::init`] can be called again.
    ///
    /// Pending asynchronous loads are invalidated; their results will be
    /// dropped when they resolve.
    pub fn destroy(&mut self) {
        self.invalidate_loads();
        self.marker_keys.clear();
        self.markers.clear();
        self.active_marker = None;
        self.feature_layers.clear();
        self.boundaries = None;
        self.base_layer = None;
        self.icons.clear();
        self.listeners.clear();
        self.view = MapView::new(self.options.center, self.options.zoom, self.options.size);
        log::info!("map in container {} destroyed", self.container);
    }

    /// Selector of the embedding page element.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Effective base style identifier, including the high-density suffix
    /// when one was applied.
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// The icon registry built at init time.
    pub fn icons(&self) -> &AHashMap<String, Icon> {
        &self.icons
    }

    /// Current view center.
    pub fn center(&self) -> LatLng {
        self.view.center()
    }

    /// Re-centers the view on the given `"lat,lng"` string.
    pub fn set_center(&mut self, geo: &str) -> Result<(), MapError> {
        let center: LatLng = geo.parse()?;
        self.apply_view(center, self.view.zoom());
        Ok(())
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.view.zoom()
    }

    /// Sets the zoom level, keeping the center.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.apply_view(self.view.center(), zoom);
    }

    /// Geographic rectangle currently covered by the view.
    pub fn bounds(&self) -> LatLngBounds {
        self.view.bounds()
    }

    /// Read access to the view.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Registers a marker for the given `"lat,lng"` string.
    ///
    /// Keys are the literal strings: two spellings of the same coordinate
    /// are two distinct entries. Registering an already-known key returns
    /// the existing handle and ignores `options`.
    pub fn add_marker(&mut self, geo: &str, options: MarkerOptions) -> Result<MarkerId, MapError> {
        if let Some(id) = self.marker_keys.get(geo) {
            return Ok(*id);
        }

        let position: LatLng = geo.parse()?;
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;

        self.markers.insert(id, Marker::new(position, options));
        self.marker_keys.insert(geo.to_owned(), id);
        Ok(id)
    }

    /// Looks up the marker registered under the exact coordinate string.
    pub fn marker_id(&self, geo: &str) -> Option<MarkerId> {
        self.marker_keys.get(geo).copied()
    }

    /// The marker behind a handle.
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    /// Number of distinct registered coordinate keys.
    pub fn marker_count(&self) -> usize {
        self.marker_keys.len()
    }

    /// Shows the marker registered under the given coordinate string:
    /// hides the currently active marker, makes this one active and
    /// re-centers the view on it at the marker's own zoom level.
    pub fn show_marker(&mut self, geo: &str) -> Result<(), MapError> {
        let id = self
            .marker_id(geo)
            .ok_or_else(|| MapError::UnknownMarker(geo.to_owned()))?;

        self.hide_marker();
        self.active_marker = Some(id);

        let Some(marker) = self.markers.get(&id) else {
            return Ok(());
        };
        let (position, zoom) = (marker.position, marker.zoom);
        self.apply_view(position, zoom);
        Ok(())
    }

    /// Hides the active marker, if any.
    pub fn hide_marker(&mut self) {
        self.active_marker = None;
    }

    /// The currently active marker, if any. At most one marker is active at
    /// a time.
    pub fn active_marker(&self) -> Option<MarkerId> {
        self.active_marker
    }

    /// Renders a GeoJSON document as a feature layer.
    ///
    /// Point features become markers with the `standard` icon and a popup
    /// built from the feature's `html` property (opened immediately when the
    /// `open` property is truthy). The view is fitted to the layer bounds
    /// with asymmetric padding and the zoom clamped to
    /// [`GEOJSON_MAX_ZOOM`]; fits below the ceiling are kept as computed.
    pub fn add_geo_json(&mut self, data: &GeoJson) {
        let layer = FeatureLayer::from_geo_json(data, self.icons.get(STANDARD_ICON).cloned());

        if let Some(bounds) = layer.bounds() {
            let mut fitted = self.view.clone();
            fitted.fit_bounds(
                &bounds,
                Padding::new(ScreenPoint::new(10.0, 10.0), ScreenPoint::new(25.0, 25.0)),
            );
            self.apply_view(fitted.center(), fitted.zoom().min(GEOJSON_MAX_ZOOM));
        }

        self.feature_layers.push(layer);
    }

    /// Feature layers added through [`Map::add_geo_json`].
    pub fn feature_layers(&self) -> &[FeatureLayer] {
        &self.feature_layers
    }

    /// Switches the base tile layer to the catalog source with the given
    /// name. The previous base layer is replaced, not stacked under.
    pub fn change_tiles(&mut self, name: &str) -> Result<(), MapError> {
        let source = self
            .tile_sources
            .get(name)
            .ok_or_else(|| MapError::UnknownTileSource(name.to_owned()))?
            .clone();

        log::info!("switching base tiles to {:?}", source.name);
        self.base_layer = Some(RasterTileLayer::new(source));
        Ok(())
    }

    /// The current base tile layer.
    pub fn base_layer(&self) -> Option<&RasterTileLayer> {
        self.base_layer.as_ref()
    }

    /// The tile source catalog the map selects base layers from.
    pub fn tile_sources(&self) -> &TileSourceCatalog {
        &self.tile_sources
    }

    /// Fetches the boundary dataset through `loader` and attaches the
    /// overlay it describes.
    ///
    /// The continuation is guarded by a [`LoadToken`]: when the map is
    /// destroyed or the overlay removed while the fetch is in flight, the
    /// late result is dropped and [`MapError::Cancelled`] returned. Load
    /// failures are logged and surfaced as [`MapError::Boundary`].
    pub async fn add_boundaries<L>(&mut self, loader: &L) -> Result<(), MapError>
    where
        L: BoundaryLoader + ?Sized,
    {
        let token = self.load_token();
        let data = loader.load().await.map_err(|err| {
            log::error!("failed to load boundary data: {err}");
            MapError::from(err)
        })?;
        self.apply_boundaries(token, &data)
    }

    /// Applies a fetched boundary dataset, the continuation half of
    /// [`Map::add_boundaries`]. Drops the data when `token` is stale.
    pub fn apply_boundaries(
        &mut self,
        token: LoadToken,
        data: &BoundaryData,
    ) -> Result<(), MapError> {
        if !token.is_valid() {
            log::warn!("dropping boundary data that resolved after the map was reset");
            return Err(MapError::Cancelled);
        }
        self.set_boundaries(data);
        Ok(())
    }

    /// Replaces the boundary overlay with one built from the given dataset.
    pub fn set_boundaries(&mut self, data: &BoundaryData) {
        let mut layer = BoundaryLayer::from_data(data);
        layer.sync_zoom(self.view.zoom());
        log::info!("boundary overlay attached with {} regions", layer.overlays().len());
        self.boundaries = Some(layer);
    }

    /// Removes the whole boundary overlay: every polyline, every label
    /// marker and the zoom coupling that drove label visibility. In-flight
    /// boundary loads are invalidated.
    pub fn remove_boundaries(&mut self) {
        self.invalidate_loads();
        if self.boundaries.take().is_some() {
            log::info!("boundary overlay removed");
        }
    }

    /// The boundary overlay, if one is attached.
    pub fn boundaries(&self) -> Option<&BoundaryLayer> {
        self.boundaries.as_ref()
    }

    /// Hands out a token tied to the map's current load epoch. See
    /// [`LoadToken`].
    pub fn load_token(&self) -> LoadToken {
        LoadToken {
            epoch: self.load_epoch.load(Ordering::SeqCst),
            shared: Arc::clone(&self.load_epoch),
        }
    }

    /// Subscribes a listener to map events. The returned id removes the
    /// subscription again through [`Map::off`].
    pub fn on<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Removes a listener. Returns whether it was still subscribed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Dispatches an event to every subscribed listener.
    pub fn fire(&self, event: &MapEvent) {
        for (_, callback) in &self.listeners {
            callback(event);
        }
    }

    fn apply_view(&mut self, center: LatLng, zoom: f64) {
        let center_before = self.view.center();
        let zoom_before = self.view.zoom();
        self.view.set_view(center, zoom);

        if self.view.zoom() != zoom_before {
            if let Some(boundaries) = &mut self.boundaries {
                boundaries.sync_zoom(self.view.zoom());
            }
            self.fire(&MapEvent::ZoomEnd {
                zoom: self.view.zoom(),
            });
        }

        if self.view.center() != center_before || self.view.zoom() != zoom_before {
            self.fire(&MapEvent::ViewChanged {
                center: self.view.center(),
                zoom: self.view.zoom(),
            });
        }
    }

    fn invalidate_loads(&self) {
        self.load_epoch.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::layer::boundaries::BoundaryLoadError;

    use super::*;

    fn map() -> Map {
        MapBuilder::default().build()
    }

    fn bedfordshire_data() -> BoundaryData {
        serde_json::from_value(serde_json::json!({
            "0": {
                "name": "BD",
                "polygon": ["52.0,-1.0", "52.1,-1.1", "52.0,-1.2"]
            }
        }))
        .expect("valid boundary document")
    }

    struct StaticLoader(BoundaryData);

    #[async_trait::async_trait]
    impl BoundaryLoader for StaticLoader {
        async fn load(&self) -> Result<BoundaryData, BoundaryLoadError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLoader;

    #[async_trait::async_trait]
    impl BoundaryLoader for FailingLoader {
        async fn load(&self) -> Result<BoundaryData, BoundaryLoadError> {
            Err(BoundaryLoadError::Network)
        }
    }

    #[test]
    fn init_applies_defaults() {
        let map = map();
        assert_eq!(map.container(), "#map");
        assert_eq!(map.style_id(), "52661");
        assert_eq!(map.zoom(), 14.0);
        assert_eq!(map.center(), LatLng::new(52.939534, -1.19708));
        let base = map.base_layer().expect("init attaches a base layer");
        assert_eq!(base.source().name, DEFAULT_BASE_SOURCE);
        assert!(map.icons().contains_key(STANDARD_ICON));
    }

    #[test]
    fn high_density_display_selects_2x_style() {
        let map = MapBuilder::default().with_pixel_ratio(2.0).build();
        assert_eq!(map.style_id(), "52661@2x");
    }

    #[test]
    fn build_fires_loaded_event() {
        let mut map = Map::new(MapOptions::default());
        let loaded = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&loaded);
        map.on(move |event| {
            if *event == MapEvent::Loaded {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        map.init();
        assert_eq!(loaded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn add_marker_is_keyed_by_exact_string() {
        let mut map = map();
        let first = map
            .add_marker("52.0,-1.0", MarkerOptions::default())
            .expect("valid coordinates");
        let second = map
            .add_marker("52.0,-1.0", MarkerOptions::default())
            .expect("valid coordinates");
        assert_eq!(first, second);
        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.marker_id("52.0,-1.0"), Some(first));

        // A different spelling of the same point is a distinct entry.
        let third = map
            .add_marker("52.00,-1.00", MarkerOptions::default())
            .expect("valid coordinates");
        assert_ne!(first, third);
        assert_eq!(map.marker_count(), 2);
    }

    #[test]
    fn add_marker_rejects_malformed_input() {
        let mut map = map();
        for bad in ["", "52.0", "52.0,abc", "junk"] {
            let result = map.add_marker(bad, MarkerOptions::default());
            assert!(
                matches!(result, Err(MapError::InvalidCoordinates(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(map.marker_count(), 0);
    }

    #[test]
    fn show_marker_keeps_at_most_one_active() {
        let mut map = map();
        let a = map
            .add_marker("52.0,-1.0", MarkerOptions::default())
            .expect("valid coordinates");
        let b = map
            .add_marker("53.0,-1.5", MarkerOptions::default())
            .expect("valid coordinates");

        map.show_marker("52.0,-1.0").expect("marker A exists");
        assert_eq!(map.active_marker(), Some(a));

        map.show_marker("53.0,-1.5").expect("marker B exists");
        assert_eq!(map.active_marker(), Some(b));
        // Showing re-centers on the marker at its own zoom level.
        assert_eq!(map.center(), LatLng::new(53.0, -1.5));
        assert_eq!(map.zoom(), crate::marker::DEFAULT_MARKER_ZOOM);

        map.hide_marker();
        assert_eq!(map.active_marker(), None);
    }

    #[test]
    fn show_marker_reports_unknown_keys() {
        let mut map = map();
        let result = map.show_marker("52.0,-1.0");
        assert!(matches!(result, Err(MapError::UnknownMarker(_))));
        assert_eq!(map.active_marker(), None);
    }

    #[test]
    fn set_center_rejects_malformed_input_without_moving() {
        let mut map = map();
        let before = map.center();
        assert!(map.set_center("not-a-point").is_err());
        assert_eq!(map.center(), before);

        map.set_center("51.5,-0.1").expect("valid coordinates");
        assert_eq!(map.center(), LatLng::new(51.5, -0.1));
    }

    #[test]
    fn change_tiles_selects_catalog_entry_and_replaces_base() {
        let mut map = map();
        map.change_tiles("esri").expect("esri is in the catalog");
        map.change_tiles("nls").expect("nls is in the catalog");

        let base = map.base_layer().expect("base layer present");
        assert_eq!(base.source().name, "nls");
        assert_eq!(
            base.source().url_template,
            "http://nls-0.tileserver.com/nls/{z}/{x}/{y}.jpg"
        );
        assert_eq!(
            base.attribution(),
            "Hostorical maps from 1919-1947 National Library Scotland"
        );

        assert!(matches!(
            map.change_tiles("missing"),
            Err(MapError::UnknownTileSource(_))
        ));
    }

    #[test]
    fn geo_json_fit_clamps_zoom_ceiling() {
        let mut map = map();
        // Two points a few meters apart would fit at the deepest zoom level.
        let tight: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-1.19720, 52.93860]}, "properties": {"html": "a"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-1.19721, 52.93861]}, "properties": {"html": "b"}}
            ]
        }"#
        .parse()
        .expect("valid GeoJSON");

        map.add_geo_json(&tight);
        assert_eq!(map.zoom(), GEOJSON_MAX_ZOOM);
        assert_eq!(map.feature_layers().len(), 1);
        assert_eq!(map.feature_layers()[0].markers().len(), 2);
    }

    #[test]
    fn geo_json_fit_below_ceiling_is_kept() {
        let wide: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-5.0, 50.0]}, "properties": {"html": "a"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.5, 55.0]}, "properties": {"html": "b"}}
            ]
        }"#
        .parse()
        .expect("valid GeoJSON");

        // Compute the fit a scratch view would produce for the same bounds
        // and padding.
        let mut expected = MapView::new(
            MapOptions::default().center,
            MapOptions::default().zoom,
            MapOptions::default().size,
        );
        expected.fit_bounds(
            &LatLngBounds {
                south_west: LatLng::new(50.0, -5.0),
                north_east: LatLng::new(55.0, 1.5),
            },
            Padding::new(ScreenPoint::new(10.0, 10.0), ScreenPoint::new(25.0, 25.0)),
        );
        assert!(expected.zoom() < GEOJSON_MAX_ZOOM);

        let mut map = map();
        map.add_geo_json(&wide);
        assert_eq!(map.zoom(), expected.zoom());
    }

    #[tokio::test]
    async fn add_boundaries_attaches_overlay() {
        let mut map = map();
        map.add_boundaries(&StaticLoader(bedfordshire_data()))
            .await
            .expect("loader succeeds");

        let layer = map.boundaries().expect("overlay attached");
        assert_eq!(layer.overlays().len(), 1);
        // Default zoom 14 is above the label threshold.
        assert!(layer.labels_visible());
    }

    #[tokio::test]
    async fn failed_boundary_load_leaves_map_unchanged() {
        let mut map = map();
        let result = map.add_boundaries(&FailingLoader).await;
        assert!(matches!(
            result,
            Err(MapError::Boundary(BoundaryLoadError::Network))
        ));
        assert!(map.boundaries().is_none());
    }

    #[test]
    fn stale_token_drops_late_boundary_results() {
        let mut map = map();
        let token = map.load_token();
        assert!(token.is_valid());

        map.remove_boundaries();
        assert!(!token.is_valid());

        let result = map.apply_boundaries(token, &bedfordshire_data());
        assert!(matches!(result, Err(MapError::Cancelled)));
        assert!(map.boundaries().is_none());
    }

    #[test]
    fn destroy_also_invalidates_tokens() {
        let mut map = map();
        let token = map.load_token();
        map.destroy();
        assert!(!token.is_valid());
    }

    #[test]
    fn label_visibility_follows_map_zoom() {
        let mut map = map();
        map.set_boundaries(&bedfordshire_data());
        assert!(map.boundaries().expect("overlay").labels_visible());

        map.set_zoom(6.0);
        assert!(!map.boundaries().expect("overlay").labels_visible());

        map.set_zoom(7.0);
        assert!(map.boundaries().expect("overlay").labels_visible());
    }

    #[test]
    fn remove_boundaries_detaches_zoom_coupling() {
        let mut map = map();
        map.set_boundaries(&bedfordshire_data());
        map.remove_boundaries();
        assert!(map.boundaries().is_none());

        // Zoom changes after removal must not resurrect overlay state.
        map.set_zoom(6.0);
        map.set_zoom(14.0);
        assert!(map.boundaries().is_none());
    }

    #[test]
    fn zoom_change_emits_zoom_end() {
        let mut map = map();
        let zooms = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&zooms);
        let id = map.on(move |event| {
            if let MapEvent::ZoomEnd { zoom } = event {
                seen.lock().expect("listener lock").push(*zoom);
            }
        });

        map.set_zoom(9.0);
        map.set_zoom(9.0); // unchanged zoom emits no ZoomEnd
        map.set_zoom(11.0);
        assert_eq!(*zooms.lock().expect("listener lock"), vec![9.0, 11.0]);

        assert!(map.off(id));
        assert!(!map.off(id));
        map.set_zoom(5.0);
        assert_eq!(zooms.lock().expect("listener lock").len(), 2);
    }

    #[test]
    fn destroy_resets_all_container_fields() {
        let mut map = map();
        map.add_marker("52.0,-1.0", MarkerOptions::default())
            .expect("valid coordinates");
        map.show_marker("52.0,-1.0").expect("marker exists");
        map.set_boundaries(&bedfordshire_data());

        map.destroy();
        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.active_marker(), None);
        assert!(map.boundaries().is_none());
        assert!(map.base_layer().is_none());
        assert!(map.feature_layers().is_empty());

        // A destroyed map can be initialized again.
        map.init();
        assert!(map.base_layer().is_some());
        assert_eq!(map.zoom(), 14.0);
    }
}
