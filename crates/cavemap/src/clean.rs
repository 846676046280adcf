//! Normalization of scraped cave rows into typed records.
//!
//! Every function here is pure. A malformed field is reported as a [`FormatError`]
//! and [`clean_table`] refuses to produce a partial batch.

use crate::types::{CleanRecord, RawRow};

use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static DMS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^°]+)°([^′]+)′([^″]+)″([NSEW])$").unwrap());
static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^°]+)°([NSEW])$").unwrap());

const SECONDS_MARK: char = '″';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Depth,
    Length,
    Coordinates,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Depth => write!(f, "depth"),
            Field::Length => write!(f, "length"),
            Field::Coordinates => write!(f, "coordinates"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Malformed {field} '{text}': {reason}")]
pub struct FormatError {
    pub field: Field,
    pub text: String,
    pub reason: String,
}

impl FormatError {
    fn new(field: Field, text: &str, reason: impl Into<String>) -> Self {
        Self {
            field,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Leading integer of a depth cell, ignoring any `[n]` reference annotation.
pub fn parse_depth(text: &str) -> Result<u32, FormatError> {
    let leading = text.split('[').next().unwrap_or_default().trim();
    leading
        .parse::<u32>()
        .map_err(|e| FormatError::new(Field::Depth, text, e.to_string()))
}

/// First whitespace-separated token of a length cell, e.g. `"14.7 km"` -> `14.7`.
pub fn parse_length(text: &str) -> Result<f64, FormatError> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| FormatError::new(Field::Length, text, "empty value"))?;
    parse_magnitude(token).map_err(|reason| FormatError::new(Field::Length, text, reason))
}

/// Drops links into wiki internals (edit pages, red links); keeps article links as-is.
pub fn clean_url(url: Option<&str>) -> Option<String> {
    url.filter(|u| !u.contains("index.php")).map(str::to_string)
}

/// Parses `"<lat> <lon>"` in either DMS (`40°26′46″N`) or decimal-degree (`14°N`) notation.
///
/// The notation is picked from the latitude token: if it carries a seconds mark, both
/// tokens must be DMS, otherwise both must be decimal degrees. South and west are negative.
pub fn parse_coordinates(text: &str) -> Result<(f64, f64), FormatError> {
    let err = |reason: String| FormatError::new(Field::Coordinates, text, reason);

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let &[lat, lon] = tokens.as_slice() else {
        return Err(err(format!(
            "expected 2 whitespace-separated tokens, found {}",
            tokens.len()
        )));
    };

    let parse_token: fn(&str) -> Result<f64, String> = if lat.contains(SECONDS_MARK) {
        parse_dms
    } else {
        parse_decimal
    };

    let latitude = parse_token(lat).map_err(err)?;
    let longitude = parse_token(lon).map_err(err)?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(err(format!("latitude {latitude} out of range [-90, 90]")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(err(format!("longitude {longitude} out of range [-180, 180]")));
    }

    Ok((latitude, longitude))
}

fn parse_dms(token: &str) -> Result<f64, String> {
    let caps = DMS_PATTERN
        .captures(token)
        .ok_or_else(|| format!("'{token}' is not in D°M′S″H notation"))?;

    let degrees = parse_magnitude(&caps[1])?;
    let minutes = parse_magnitude(&caps[2])?;
    let seconds = parse_magnitude(&caps[3])?;

    Ok(hemisphere_sign(&caps[4]) * (degrees + minutes / 60.0 + seconds / 3600.0))
}

fn parse_decimal(token: &str) -> Result<f64, String> {
    let caps = DECIMAL_PATTERN
        .captures(token)
        .ok_or_else(|| format!("'{token}' is not in D°H notation"))?;

    Ok(hemisphere_sign(&caps[2]) * parse_magnitude(&caps[1])?)
}

fn hemisphere_sign(letter: &str) -> f64 {
    match letter {
        "S" | "W" => -1.0,
        _ => 1.0,
    }
}

fn parse_magnitude(s: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("'{s}' is not a finite non-negative number"));
    }
    Ok(value)
}

pub fn clean_row(row: &RawRow) -> Result<CleanRecord, FormatError> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err(FormatError::new(Field::Name, &row.name, "empty value"));
    }

    let depth_m = parse_depth(&row.depth)?;
    let length_km = parse_length(&row.length)?;
    let source_url = clean_url(row.link.as_deref());
    let (latitude, longitude) = parse_coordinates(&row.coordinates)?;

    Ok(CleanRecord {
        name: name.to_string(),
        depth_m,
        length_km,
        location: row.location.clone(),
        source_url,
        latitude,
        longitude,
    })
}

/// Cleans every row in order. The first malformed row fails the whole batch.
pub fn clean_table(rows: &[RawRow]) -> Result<Vec<CleanRecord>, FormatError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            clean_row(row).inspect_err(|e| {
                log::debug!("Row {} ('{}') rejected: {}", i + 1, row.name, e);
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn row(name: &str, coordinates: &str, link: Option<&str>) -> RawRow {
        RawRow::new(
            name,
            "2212[1]",
            "14.7 km",
            "Abkhazia, Georgia",
            coordinates,
            link.map(str::to_string),
        )
    }

    #[test]
    fn test_parse_depth_strips_annotation() {
        assert_eq!(parse_depth("2212[1]").unwrap(), 2212);
        assert_eq!(parse_depth("250").unwrap(), 250);
        assert_eq!(parse_depth(" 1604 [note 2]").unwrap(), 1604);
    }

    #[test]
    fn test_parse_depth_rejects_non_integer() {
        let err = parse_depth("deep[1]").unwrap_err();
        assert_eq!(err.field, Field::Depth);
        assert_eq!(err.text, "deep[1]");
        assert!(parse_depth("").is_err());
        assert!(parse_depth("-5").is_err());
        assert!(parse_depth("1,234").is_err());
    }

    #[test]
    fn test_parse_length_takes_leading_token() {
        assert_eq!(parse_length("14.7 km").unwrap(), 14.7);
        assert_eq!(parse_length("14.7").unwrap(), 14.7);
        assert_eq!(parse_length("  3 km[2]").unwrap(), 3.0);
    }

    #[test]
    fn test_parse_length_rejects_bad_token() {
        assert_eq!(parse_length("km 14").unwrap_err().field, Field::Length);
        assert!(parse_length("").is_err());
        assert!(parse_length("   ").is_err());
        assert!(parse_length("NaN km").is_err());
        assert!(parse_length("-1 km").is_err());
    }

    #[test]
    fn test_clean_url() {
        assert_eq!(clean_url(None), None);
        assert_eq!(
            clean_url(Some("https://en.wikipedia.org/w/index.php?title=X")),
            None
        );
        assert_eq!(
            clean_url(Some("https://en.wikipedia.org/wiki/X")),
            Some("https://en.wikipedia.org/wiki/X".to_string())
        );

        let once = clean_url(Some("https://en.wikipedia.org/wiki/Krubera_Cave"));
        assert_eq!(clean_url(once.as_deref()), once);
    }

    #[test]
    fn test_parse_dms_coordinates() {
        let (lat, lon) = parse_coordinates("40°26′46″N 79°58′56″W").unwrap();
        assert!((lat - (40.0 + 26.0 / 60.0 + 46.0 / 3600.0)).abs() < TOLERANCE);
        assert!((lon + (79.0 + 58.0 / 60.0 + 56.0 / 3600.0)).abs() < TOLERANCE);
        assert!((lat - 40.4461).abs() < 1e-4);
        assert!((lon + 79.9822).abs() < 1e-4);
    }

    #[test]
    fn test_parse_dms_hemisphere_signs() {
        let (lat, lon) = parse_coordinates("43°24′18.5″S 172°40′3″E").unwrap();
        assert!(lat < 0.0);
        assert!(lon > 0.0);
        assert!((lat + (43.0 + 24.0 / 60.0 + 18.5 / 3600.0)).abs() < TOLERANCE);
        assert!((lon - (172.0 + 40.0 / 60.0 + 3.0 / 3600.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_parse_decimal_coordinates() {
        assert_eq!(parse_coordinates("14°N 90°S").unwrap(), (14.0, -90.0));
        assert_eq!(
            parse_coordinates("43.4167°N 40.3667°W").unwrap(),
            (43.4167, -40.3667)
        );
        assert_eq!(parse_coordinates("90°S 0°E").unwrap(), (-90.0, 0.0));
    }

    #[test]
    fn test_parse_coordinates_token_count() {
        assert!(parse_coordinates("40°26′46″N").is_err());
        assert!(parse_coordinates("").is_err());
        assert!(parse_coordinates("14°N 15°E 16°E").is_err());
    }

    #[test]
    fn test_parse_coordinates_rejects_unknown_notation() {
        let err = parse_coordinates("garbage").unwrap_err();
        assert_eq!(err.field, Field::Coordinates);

        assert!(parse_coordinates("40°26′N 79°58′W").is_err());
        assert!(parse_coordinates("40°26′46″X 79°58′56″W").is_err());
        assert!(parse_coordinates("40.1 79.2").is_err());
        assert!(parse_coordinates("a°b′c″N 79°58′56″W").is_err());
        assert!(parse_coordinates("40°26′46″N 79.98°W").is_err());
    }

    #[test]
    fn test_parse_coordinates_range() {
        assert!(parse_coordinates("91°N 0°E").is_err());
        assert!(parse_coordinates("0°N 181°W").is_err());
        assert!(parse_coordinates("89°59′59″N 180°0′0″W").is_ok());
    }

    #[test]
    fn test_clean_row() {
        let record = clean_row(&row(
            " Veryovkina Cave ",
            "43°24′54″N 40°21′24″E",
            Some("https://en.wikipedia.org/wiki/Veryovkina_Cave"),
        ))
        .unwrap();

        assert_eq!(record.name, "Veryovkina Cave");
        assert_eq!(record.depth_m, 2212);
        assert_eq!(record.length_km, 14.7);
        assert_eq!(record.location, "Abkhazia, Georgia");
        assert_eq!(
            record.source_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Veryovkina_Cave")
        );
        assert!((record.latitude - 43.415).abs() < TOLERANCE);
        assert!((record.longitude - (40.0 + 21.0 / 60.0 + 24.0 / 3600.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_clean_row_reports_fields_in_column_order() {
        let mut bad = row("Sarma", "garbage", None);
        bad.depth = "deep".to_string();
        bad.length = "long".to_string();
        assert_eq!(clean_row(&bad).unwrap_err().field, Field::Depth);

        bad.depth = "1830".to_string();
        assert_eq!(clean_row(&bad).unwrap_err().field, Field::Length);

        bad.length = "6.5 km".to_string();
        assert_eq!(clean_row(&bad).unwrap_err().field, Field::Coordinates);
    }

    #[test]
    fn test_clean_row_rejects_empty_name() {
        let err = clean_row(&row("  ", "14°N 15°E", None)).unwrap_err();
        assert_eq!(err.field, Field::Name);
    }

    #[test]
    fn test_clean_table_preserves_order() {
        let rows = vec![
            row("A", "14°N 15°E", None),
            row("B", "40°26′46″N 79°58′56″W", None),
            row(
                "C",
                "1°S 2°W",
                Some("https://en.wikipedia.org/w/index.php?title=C&action=edit&redlink=1"),
            ),
        ];

        let records = clean_table(&rows).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(records[2].source_url, None);
        assert_eq!((records[2].latitude, records[2].longitude), (-1.0, -2.0));
    }

    #[test]
    fn test_clean_table_fails_whole_batch() {
        let rows = vec![
            row("A", "14°N 15°E", None),
            row("B", "garbage", None),
            row("C", "also garbage", None),
        ];

        let err = clean_table(&rows).unwrap_err();
        assert_eq!(err.field, Field::Coordinates);
        assert_eq!(err.text, "garbage");
    }

    #[test]
    fn test_clean_table_empty() {
        assert!(clean_table(&[]).unwrap().is_empty());
    }
}
