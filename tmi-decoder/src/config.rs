//! Decoder configuration types
//!
//! The decoder needs very little configuration: the capture layout is fixed, so
//! only I/O buffering and progress reporting are tunable.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Capacity of the buffered reader wrapped around the capture file
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Log a progress line every N frames (0 disables progress logging)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_buffer_capacity() -> usize {
    64 * 1024
}

fn default_progress_interval() -> u64 {
    100_000
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the read buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Builder method: set the progress logging interval
    pub fn with_progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = frames;
        self
    }

    /// Check whether a progress line is due after `frames` frames
    pub fn should_report_progress(&self, frames: u64) -> bool {
        self.progress_interval != 0 && frames % self.progress_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_builder() {
        let config = DecoderConfig::new()
            .with_buffer_capacity(0)
            .with_progress_interval(10);

        assert_eq!(config.buffer_capacity, 1);
        assert!(config.should_report_progress(20));
        assert!(!config.should_report_progress(25));
    }

    #[test]
    fn test_progress_disabled() {
        let config = DecoderConfig::new().with_progress_interval(0);
        assert!(!config.should_report_progress(100_000));
    }

    #[test]
    fn test_defaults_from_empty_document() {
        let config: DecoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.buffer_capacity, 64 * 1024);
        assert_eq!(config.progress_interval, 100_000);
    }
}
