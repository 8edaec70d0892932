//! JPEG files with a hand-built EXIF block.
//!
//! Enough of TIFF to carry Make, Model and a GPS IFD, so the metadata path
//! can be tested against real files.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

const ASCII: u16 = 2;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_GPS_POINTER: u16 = 0x8825;
const TAG_LAT_REF: u16 = 0x0001;
const TAG_LAT: u16 = 0x0002;
const TAG_LON_REF: u16 = 0x0003;
const TAG_LON: u16 = 0x0004;

/// Degrees, minutes, seconds and hemisphere letter.
#[derive(Debug, Clone, Copy)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub hemisphere: char,
}

impl Dms {
    #[must_use]
    pub const fn new(degrees: u32, minutes: u32, seconds: u32, hemisphere: char) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
            hemisphere,
        }
    }
}

struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

impl Entry {
    fn ascii(tag: u16, s: &str) -> Self {
        let mut data = s.as_bytes().to_vec();
        data.push(0);
        Self {
            tag,
            kind: ASCII,
            count: u32::try_from(data.len()).unwrap_or(u32::MAX),
            data,
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            kind: LONG,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    fn dms(tag: u16, dms: Dms) -> Self {
        let mut data = Vec::with_capacity(24);
        for v in [dms.degrees, dms.minutes, dms.seconds] {
            data.extend_from_slice(&v.to_le_bytes());
            data.extend_from_slice(&1u32.to_le_bytes());
        }
        Self {
            tag,
            kind: RATIONAL,
            count: 3,
            data,
        }
    }
}

/// Byte length of an IFD including its out-of-line values.
fn ifd_len(entries: &[Entry]) -> usize {
    let overflow: usize = entries
        .iter()
        .filter(|e| e.data.len() > 4)
        .map(|e| e.data.len() + e.data.len() % 2)
        .sum();
    2 + 12 * entries.len() + 4 + overflow
}

/// Serializes a little-endian IFD that will sit at `offset` in the TIFF block.
fn write_ifd(entries: &[Entry], offset: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut overflow = Vec::new();
    let overflow_start = offset + 2 + 12 * entries.len() + 4;

    out.extend_from_slice(&u16::try_from(entries.len()).unwrap_or(0).to_le_bytes());
    for e in entries {
        out.extend_from_slice(&e.tag.to_le_bytes());
        out.extend_from_slice(&e.kind.to_le_bytes());
        out.extend_from_slice(&e.count.to_le_bytes());
        if e.data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..e.data.len()].copy_from_slice(&e.data);
            out.extend_from_slice(&inline);
        } else {
            let at = u32::try_from(overflow_start + overflow.len()).unwrap_or(0);
            out.extend_from_slice(&at.to_le_bytes());
            overflow.extend_from_slice(&e.data);
            if e.data.len() % 2 == 1 {
                overflow.push(0);
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&overflow);
    out
}

/// Builds a JPEG with an APP1 EXIF segment.
#[derive(Debug, Clone)]
pub struct ExifJpegBuilder {
    pixels: RgbImage,
    make: Option<String>,
    model: Option<String>,
    gps: Option<(Dms, Dms)>,
}

impl ExifJpegBuilder {
    #[must_use]
    pub const fn new(pixels: RgbImage) -> Self {
        Self {
            pixels,
            make: None,
            model: None,
            gps: None,
        }
    }

    #[must_use]
    pub fn make(mut self, make: &str) -> Self {
        self.make = Some(make.to_string());
        self
    }

    #[must_use]
    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    #[must_use]
    pub fn gps(mut self, lat: Dms, lon: Dms) -> Self {
        self.gps = Some((lat, lon));
        self
    }

    fn tiff(&self) -> Vec<u8> {
        let mut ifd0 = Vec::new();
        if let Some(make) = &self.make {
            ifd0.push(Entry::ascii(TAG_MAKE, make));
        }
        if let Some(model) = &self.model {
            ifd0.push(Entry::ascii(TAG_MODEL, model));
        }

        let gps_entries = self.gps.map(|(lat, lon)| {
            vec![
                Entry::ascii(TAG_LAT_REF, &lat.hemisphere.to_string()),
                Entry::dms(TAG_LAT, lat),
                Entry::ascii(TAG_LON_REF, &lon.hemisphere.to_string()),
                Entry::dms(TAG_LON, lon),
            ]
        });
        if gps_entries.is_some() {
            // Placeholder; the pointer's size is fixed so layout is unaffected.
            ifd0.push(Entry::long(TAG_GPS_POINTER, 0));
        }

        let ifd0_offset = 8;
        let gps_offset = ifd0_offset + ifd_len(&ifd0);
        if let Some(last) = ifd0.last_mut() {
            if last.tag == TAG_GPS_POINTER {
                *last = Entry::long(TAG_GPS_POINTER, u32::try_from(gps_offset).unwrap_or(0));
            }
        }

        let mut tiff = b"II*\0".to_vec();
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend(write_ifd(&ifd0, ifd0_offset));
        if let Some(gps) = gps_entries {
            tiff.extend(write_ifd(&gps, gps_offset));
        }
        tiff
    }

    /// Encodes the JPEG and splices the EXIF segment in after SOI.
    ///
    /// # Errors
    ///
    /// Returns an error if JPEG encoding fails.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), 95)
            .write_image(
                self.pixels.as_raw(),
                self.pixels.width(),
                self.pixels.height(),
                ExtendedColorType::Rgb8,
            )
            .context("Failed to encode test JPEG")?;

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend(self.tiff());
        let len = u16::try_from(payload.len() + 2).context("EXIF block too large")?;

        let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend(payload);
        out.extend_from_slice(&jpeg[2..]);
        Ok(out)
    }

    /// Writes the JPEG to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.build()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
