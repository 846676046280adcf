use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One table row as scraped, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub name: String,
    pub depth: String,
    pub length: String,
    pub location: String,
    pub coordinates: String,
    pub link: Option<String>,
}

impl RawRow {
    pub fn new(
        name: impl Into<String>,
        depth: impl Into<String>,
        length: impl Into<String>,
        location: impl Into<String>,
        coordinates: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            depth: depth.into(),
            length: length.into(),
            location: location.into(),
            coordinates: coordinates.into(),
            link,
        }
    }
}

/// A fully parsed cave entry, ready to be placed on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub name: String,
    pub depth_m: u32,
    pub length_km: f64,
    pub location: String,
    pub source_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for CleanRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} m, {} km ({}) [{:.4}, {:.4}]",
            self.name, self.depth_m, self.length_km, self.location, self.latitude, self.longitude
        )
    }
}
