//! Per-channel color histograms.

use image::RgbImage;

pub const BINS: usize = 256;

/// L1-normalized 256-bin histograms for R, G and B
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHistograms {
    pub red: [f64; BINS],
    pub green: [f64; BINS],
    pub blue: [f64; BINS],
}

impl ChannelHistograms {
    /// Histogram every pixel of `image`. An empty image yields all-zero bins.
    pub fn from_image(image: &RgbImage) -> Self {
        let mut counts = [[0u64; BINS]; 3];
        for pixel in image.pixels() {
            counts[0][pixel[0] as usize] += 1;
            counts[1][pixel[1] as usize] += 1;
            counts[2][pixel[2] as usize] += 1;
        }

        let total = image.width() as u64 * image.height() as u64;
        let [red, green, blue] = counts.map(|channel| normalize(&channel, total));
        Self { red, green, blue }
    }

    /// Channels in R, G, B order
    pub fn channels(&self) -> [&[f64; BINS]; 3] {
        [&self.red, &self.green, &self.blue]
    }
}

fn normalize(counts: &[u64; BINS], total: u64) -> [f64; BINS] {
    let mut bins = [0.0; BINS];
    if total == 0 {
        return bins;
    }
    for (bin, &count) in bins.iter_mut().zip(counts.iter()) {
        *bin = count as f64 / total as f64;
    }
    bins
}
