//! EXIF tag reader backed by `kamadak-exif`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use exif::{Field, In, Tag, Value};
use photo_shield_core::ports::keys;
use photo_shield_core::{TagMap, TagReader, TagValue};
use tracing::debug;

/// Containers `kamadak-exif` can read.
const EXIF_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tif", "tiff", "webp", "heic", "heif",
];

/// Reads the primary IFD and the GPS IFD of an image file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifTagReader;

impl ExifTagReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TagReader for ExifTagReader {
    fn read_tags(&self, path: &str) -> Result<Option<TagMap>> {
        let path = Path::new(path);
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .is_some_and(|e| EXIF_EXTENSIONS.contains(&e.as_str()));
        if !supported {
            debug!("No EXIF container for {}", path.display());
            return Ok(None);
        }

        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Corrupt EXIF in {}", path.display()))
            }
        };

        let mut tags = TagMap::new();
        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            if field.tag == Tag::GPSInfoIFDPointer || field.tag.context() == exif::Context::Gps {
                tags.entry(keys::GPS_INFO.to_string())
                    .or_insert_with(|| TagValue::Numbers(vec![]));
            }
            if let Some(value) = tag_value(field) {
                tags.insert(field.tag.to_string(), value);
            }
        }

        debug!("Read {} EXIF tags from {}", tags.len(), path.display());
        Ok(if tags.is_empty() { None } else { Some(tags) })
    }
}

#[allow(clippy::cast_lossless)]
fn tag_value(field: &Field) -> Option<TagValue> {
    let numbers = match &field.value {
        Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
                .collect::<Vec<_>>()
                .join(" ");
            return Some(TagValue::Text(text));
        }
        Value::Byte(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Short(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Long(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::SShort(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::SLong(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Rational(v) => v.iter().map(exif::Rational::to_f64).collect(),
        Value::SRational(v) => v.iter().map(exif::SRational::to_f64).collect(),
        Value::Float(v) => v.iter().map(|&n| f64::from(n)).collect(),
        Value::Double(v) => v.clone(),
        _ => return None,
    };
    Some(TagValue::Numbers(numbers))
}
