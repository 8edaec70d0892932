//! 256-bin intensity histogram.

/// Counts of 8-bit intensity values.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    /// Computes the histogram of a single-channel image.
    #[must_use]
    pub fn from_luma(image: &image::GrayImage) -> Self {
        let mut bins = [0u64; 256];
        for pixel in image.pixels() {
            bins[usize::from(pixel.0[0])] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// Returns the total pixel count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Count of pixels with value `< limit`.
    #[must_use]
    pub fn count_under(&self, limit: u8) -> u64 {
        self.bins[..usize::from(limit)].iter().sum()
    }

    /// Count of pixels with value `>= floor`.
    #[must_use]
    pub fn count_from(&self, floor: u8) -> u64 {
        self.bins[usize::from(floor)..].iter().sum()
    }

    /// Count of pixels with value `> level`.
    #[must_use]
    pub fn count_over(&self, level: u8) -> u64 {
        self.bins[usize::from(level) + 1..].iter().sum()
    }

    /// Mean intensity.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64) * count)
            .sum();
        sum as f64 / self.total as f64
    }
}
