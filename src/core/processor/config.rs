//! Processor configuration and builder.

use super::Processor;
use crate::core::fingerprint::{DefaultCodec, ImageCodec, DEFAULT_THUMBNAIL_SIZE};
use crate::core::scanner::ScanConfig;
use crate::core::scheduler::{default_workers, DEFAULT_PROGRESS_INTERVAL};
use crate::core::similarity::SimilarityWeights;
use crate::error::{CuttleError, Result};
use crate::events::EventSender;
use std::sync::Arc;
use std::time::Duration;

/// Default side of the comparison grid
pub const DEFAULT_RESOLUTION: u16 = 32;

/// Default review threshold for "show me matches"
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Run configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Side `R` of the `R × R` comparison grid
    pub resolution: u16,
    /// Longest side of the preview thumbnail
    pub thumbnail_size: u32,
    /// Worker thread count
    pub workers: usize,
    /// Minimum gap between progress updates
    pub progress_interval: Duration,
    /// Scanner configuration
    pub scan: ScanConfig,
    /// Signal weights used when scoring
    pub weights: SimilarityWeights,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            workers: default_workers(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            scan: ScanConfig::default(),
            weights: SimilarityWeights::default(),
        }
    }
}

/// Builder for [`Processor`]
pub struct ProcessorBuilder {
    config: ProcessorConfig,
    codec: Option<Arc<dyn ImageCodec>>,
    events: Option<EventSender>,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
            codec: None,
            events: None,
        }
    }

    /// Set the comparison grid resolution
    pub fn resolution(mut self, resolution: u16) -> Self {
        self.config.resolution = resolution;
        self
    }

    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.config.thumbnail_size = size;
        self
    }

    /// Set the worker thread count
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan.include_hidden = include;
        self
    }

    /// Accept every file regardless of extension
    pub fn all_files(mut self, all: bool) -> Self {
        self.config.scan.all_files = all;
        self
    }

    pub fn weights(mut self, weights: SimilarityWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// Replace the image decoder
    pub fn codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Where lifecycle and progress events go
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the configuration and build the processor
    pub fn build(self) -> Result<Processor> {
        if self.config.resolution == 0 {
            return Err(CuttleError::Config(
                "resolution must be at least 1".to_string(),
            ));
        }
        if self.config.workers == 0 {
            return Err(CuttleError::Config(
                "workers must be at least 1".to_string(),
            ));
        }

        let codec = self.codec.unwrap_or_else(|| Arc::new(DefaultCodec));
        let events = self.events.unwrap_or_else(crate::events::null_sender);
        Processor::from_parts(self.config, codec, events)
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ProcessorConfig::default();
        assert_eq!(config.resolution, 32);
        assert_eq!(config.thumbnail_size, 128);
        assert_eq!(config.progress_interval, Duration::from_millis(125));
        assert!(config.workers >= 1);
        assert!(!config.scan.include_hidden);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let result = ProcessorBuilder::new().resolution(0).build();
        assert!(matches!(result, Err(CuttleError::Config(_))));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = ProcessorBuilder::new().workers(0).build();
        assert!(matches!(result, Err(CuttleError::Config(_))));
    }

    #[test]
    fn builder_settings_reach_the_processor() {
        let processor = ProcessorBuilder::new()
            .resolution(16)
            .workers(2)
            .include_hidden(true)
            .build()
            .unwrap();

        assert_eq!(processor.config().resolution, 16);
        assert_eq!(processor.config().workers, 2);
        assert!(processor.config().scan.include_hidden);
    }
}
