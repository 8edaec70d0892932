//! JSON output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use photo_shield_core::{ResultOutput, ScanRecord};
use serde_json::Value;

/// Writes scan records as JSON Lines, or as one array on flush.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Buffered records in array mode, with the pretty flag.
    array: Option<(Mutex<Vec<Value>>, bool)>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            array: None,
        }
    }

    /// Switches to array mode: records are collected and written on flush.
    #[must_use]
    pub fn as_array(mut self, pretty: bool) -> Self {
        self.array = Some((Mutex::new(Vec::new()), pretty));
        self
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, record: &ScanRecord) -> Result<()> {
        if let Some((buffer, _)) = &self.array {
            let value = serde_json::to_value(record)?;
            buffer
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                .push(value);
            return Ok(());
        }
        self.write_line(&serde_json::to_string(record)?)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        if let Some((buffer, pretty)) = &self.array {
            let records = std::mem::take(
                &mut *buffer
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?,
            );
            let json = if *pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            self.write_line(&json)?;
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shared in-memory sink.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(path: &str) -> ScanRecord {
        use photo_shield_core::{ScanConfig, Scanner};
        use photo_shield_test_support::{MockPorts, SyntheticImageBuilder};

        let scanner =
            Scanner::new(ScanConfig::default(), MockPorts::clean().collaborators()).unwrap();
        let image = SyntheticImageBuilder::uniform_gray(16, 16, 128);
        ScanRecord {
            path: path.into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            dimensions: image.dimensions(),
            report: scanner.scan(&image).unwrap().report,
        }
    }

    #[test]
    fn test_jsonl_writes_each_record() {
        let sink = Captured::default();
        let output = JsonOutput::new(Box::new(sink.clone()));
        output.write(&record("a.jpg")).unwrap();
        output.write(&record("b.jpg")).unwrap();
        output.flush().unwrap();

        let text = sink.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["path"], "a.jpg");
        assert_eq!(first["score"], 100);
        assert_eq!(first["status"], "SAFE");
        assert_eq!(first["dimensions"]["width"], 16);
    }

    #[test]
    fn test_array_mode_writes_on_flush() {
        let sink = Captured::default();
        let output = JsonOutput::new(Box::new(sink.clone())).as_array(false);
        output.write(&record("a.jpg")).unwrap();
        assert!(sink.text().is_empty());

        output.flush().unwrap();
        let parsed: Value = serde_json::from_str(sink.text().trim()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }
}
