//! Renders cleaned records as a standalone Leaflet map.

use crate::types::CleanRecord;

use chrono::Utc;
use serde::Serialize;
use std::path::Path;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<!-- __GENERATED__ -->
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
L.tileLayer("https://tile.openstreetmap.org/{z}/{x}/{y}.png", {
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}).addTo(map);
var color = __COLOR__;
var markers = __MARKERS__;
markers.forEach(function (m) {
  L.circleMarker([m.lat, m.lon], { color: color, fillColor: color, fillOpacity: 0.8, radius: 7 })
    .bindTooltip(m.tooltip)
    .bindPopup(m.popup)
    .addTo(map);
});
</script>
</body>
</html>
"#;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Failed to serialize markers: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write map: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: (f64, f64),
    pub zoom: u8,
    pub marker_color: String,
    pub title: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            zoom: 2,
            marker_color: "green".to_string(),
            title: "Deepest caves".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    tooltip: String,
    popup: String,
}

impl From<&CleanRecord> for Marker {
    fn from(record: &CleanRecord) -> Self {
        Marker {
            lat: record.latitude,
            lon: record.longitude,
            tooltip: escape_html(&record.name),
            popup: popup_html(record),
        }
    }
}

fn popup_html(record: &CleanRecord) -> String {
    match record.source_url.as_deref() {
        Some(url) if url.starts_with('h') => {
            let url = escape_html(url);
            format!(
                "Depth: {}, Wiki: <a href=\"{url}\" target=\"_blank\">{url}</a>",
                record.depth_m
            )
        }
        _ => format!("Depth: {}", record.depth_m),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Default)]
pub struct MapRenderer {
    options: MapOptions,
}

impl MapRenderer {
    pub fn new(options: MapOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, records: &[CleanRecord]) -> Result<String, MapError> {
        let markers: Vec<Marker> = records.iter().map(Marker::from).collect();
        // Popups carry anchors; "</" must not appear verbatim inside the script block.
        let markers = serde_json::to_string(&markers)?.replace("</", "<\\/");
        let color = serde_json::to_string(&escape_html(&self.options.marker_color))?;
        let (lat, lon) = self.options.center;

        Ok(TEMPLATE
            .replace(
                "__GENERATED__",
                &format!("Generated by cavemap at {}", Utc::now().to_rfc3339()),
            )
            .replace("__TITLE__", &escape_html(&self.options.title))
            .replace("__CENTER_LAT__", &lat.to_string())
            .replace("__CENTER_LON__", &lon.to_string())
            .replace("__ZOOM__", &self.options.zoom.to_string())
            .replace("__COLOR__", &color)
            .replace("__MARKERS__", &markers))
    }

    pub fn save(&self, records: &[CleanRecord], path: impl AsRef<Path>) -> Result<(), MapError> {
        let path = path.as_ref();
        let html = self.render(records)?;
        std::fs::write(path, html)?;
        log::info!("Saved map with {} markers to {}", records.len(), path.display());
        Ok(())
    }
}
