//! Metadata risk: GPS presence, device identity and coordinates.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::{ImageInfo, MetadataReport};
use crate::ports::{keys, TagMap, TagReader, TagValue};

/// Builds a [`MetadataReport`] from the tags embedded in an image file.
pub struct MetadataRisk {
    reader: Arc<dyn TagReader>,
}

impl MetadataRisk {
    #[must_use]
    pub fn new(reader: Arc<dyn TagReader>) -> Self {
        Self { reader }
    }

    /// Reads and interprets the tags of `image`'s source file.
    ///
    /// A file without tags yields the default report.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag reader fails.
    pub fn analyze(&self, image: &ImageInfo) -> Result<MetadataReport> {
        let tags = self
            .reader
            .read_tags(&image.path)
            .with_context(|| format!("Failed to read metadata from {}", image.path))?;

        Ok(tags.as_ref().map(report_from_tags).unwrap_or_default())
    }
}

/// Interprets a tag map. Model wins over Make regardless of map order.
#[must_use]
pub fn report_from_tags(tags: &TagMap) -> MetadataReport {
    let text = |key: &str| {
        tags.get(key)
            .and_then(TagValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let device_info = text(keys::MODEL)
        .or_else(|| text(keys::MAKE))
        .unwrap_or(MetadataReport::UNKNOWN_DEVICE)
        .to_string();

    let lat = coordinate(tags, keys::GPS_LATITUDE, keys::GPS_LATITUDE_REF, "S");
    let lon = coordinate(tags, keys::GPS_LONGITUDE, keys::GPS_LONGITUDE_REF, "W");
    let gps_found = tags.contains_key(keys::GPS_INFO);

    debug!("metadata: device={device_info}, gps={gps_found}, lat={lat:?}, lon={lon:?}");

    MetadataReport {
        gps_found,
        device_info,
        lat,
        lon,
    }
}

/// Decimal degrees from a degree/minute/second triple and its hemisphere ref.
fn coordinate(tags: &TagMap, key: &str, ref_key: &str, negative_ref: &str) -> Option<f64> {
    let parts = tags.get(key)?.as_numbers()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let degrees = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(v, div)| v / div)
        .sum::<f64>();
    if !degrees.is_finite() {
        return None;
    }

    let negative = tags
        .get(ref_key)
        .and_then(TagValue::as_text)
        .is_some_and(|r| r.trim().eq_ignore_ascii_case(negative_ref));

    Some(if negative { -degrees } else { degrees })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> TagValue {
        TagValue::Text(s.to_string())
    }

    #[test]
    fn test_model_wins_over_make() {
        let tags = TagMap::from([
            (keys::MAKE.to_string(), text("Canon")),
            (keys::MODEL.to_string(), text("EOS R5")),
        ]);
        assert_eq!(report_from_tags(&tags).device_info, "EOS R5");
    }

    #[test]
    fn test_make_used_without_model() {
        let tags = TagMap::from([(keys::MAKE.to_string(), text("Canon"))]);
        assert_eq!(report_from_tags(&tags).device_info, "Canon");
    }

    #[test]
    fn test_blank_model_falls_back() {
        let tags = TagMap::from([
            (keys::MAKE.to_string(), text("Canon")),
            (keys::MODEL.to_string(), text("  ")),
        ]);
        assert_eq!(report_from_tags(&tags).device_info, "Canon");
    }

    #[test]
    fn test_empty_map_is_default() {
        assert_eq!(report_from_tags(&TagMap::new()), MetadataReport::default());
    }

    #[test]
    fn test_gps_coordinates() {
        let tags = TagMap::from([
            (keys::GPS_INFO.to_string(), TagValue::Numbers(vec![])),
            (
                keys::GPS_LATITUDE.to_string(),
                TagValue::Numbers(vec![40.0, 26.0, 46.0]),
            ),
            (keys::GPS_LATITUDE_REF.to_string(), text("N")),
            (
                keys::GPS_LONGITUDE.to_string(),
                TagValue::Numbers(vec![79.0, 58.0, 56.0]),
            ),
            (keys::GPS_LONGITUDE_REF.to_string(), text("W")),
        ]);
        let report = report_from_tags(&tags);

        assert!(report.gps_found);
        let lat = report.lat.unwrap_or_default();
        let lon = report.lon.unwrap_or_default();
        assert!((lat - 40.446_111).abs() < 1e-5, "lat={lat}");
        assert!((lon + 79.982_222).abs() < 1e-5, "lon={lon}");
    }

    #[test]
    fn test_gps_marker_without_coordinates() {
        let tags = TagMap::from([(keys::GPS_INFO.to_string(), TagValue::Numbers(vec![]))]);
        let report = report_from_tags(&tags);
        assert!(report.gps_found);
        assert!(report.lat.is_none());
    }
}
