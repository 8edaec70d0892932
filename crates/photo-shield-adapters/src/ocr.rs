//! OCR through the `tesseract` command-line tool.

use std::io::ErrorKind;
use std::process::Command;

use photo_shield_core::{ImageInfo, TextRecognizer, TextScan};
use tracing::debug;

/// Runs `tesseract <image> stdout -l <language>` on a temporary PNG.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl TesseractRecognizer {
    #[must_use]
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    fn unavailable(reason: impl Into<String>) -> TextScan {
        TextScan::Unavailable {
            reason: reason.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &ImageInfo) -> TextScan {
        let input = match tempfile::Builder::new()
            .prefix("photo-shield-ocr-")
            .suffix(".png")
            .tempfile()
        {
            Ok(f) => f.into_temp_path(),
            Err(e) => return Self::unavailable(format!("temporary file: {e}")),
        };
        if let Err(e) = image.pixels.save_with_format(&input, image::ImageFormat::Png) {
            return Self::unavailable(format!("failed to write OCR input: {e}"));
        }

        let output = Command::new(&self.command)
            .arg(&*input)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).into_owned();
                debug!("OCR read {} characters from {}", text.len(), image.path);
                TextScan::Text(text)
            }
            Ok(out) => Self::unavailable(format!(
                "{} exited with {}: {}",
                self.command,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Self::unavailable(format!("{} not found", self.command))
            }
            Err(e) => Self::unavailable(format!("failed to run {}: {e}", self.command)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let ocr = TesseractRecognizer::new("photo-shield-no-such-ocr-binary", "eng");
        let image = ImageInfo::from_rgb("t.png", image::RgbImage::new(4, 4));
        match ocr.recognize(&image) {
            TextScan::Unavailable { reason } => assert!(reason.contains("not found"), "{reason}"),
            TextScan::Text(t) => panic!("unexpected text {t:?}"),
        }
    }
}
