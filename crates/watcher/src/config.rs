//! Poll configuration

use notifyx_core::{DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for the poll-and-drain loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Read buffer size in bytes (default: 1024 records with short names)
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl PollConfig {
    pub fn with_buffer_capacity(buffer_capacity: usize) -> Self {
        Self { buffer_capacity }
    }

    /// Check that any single record will fit in the read buffer
    ///
    /// The poller itself accepts any capacity; a too-small one surfaces as
    /// `Error::BufferTooSmall` on the first oversized record.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(ConfigError::BufferCapacity {
                capacity: self.buffer_capacity,
                minimum: MIN_BUFFER_CAPACITY,
            });
        }
        Ok(())
    }
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

/// Invalid configuration value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("buffer_capacity {capacity} is below the {minimum}-byte minimum for one record")]
    BufferCapacity { capacity: usize, minimum: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PollConfig::default();
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_capacity_rejected() {
        let config = PollConfig::with_buffer_capacity(64);
        assert_eq!(
            config.validate(),
            Err(ConfigError::BufferCapacity {
                capacity: 64,
                minimum: MIN_BUFFER_CAPACITY
            })
        );
        assert!(PollConfig::with_buffer_capacity(MIN_BUFFER_CAPACITY)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_toml_defaults() {
        let config: PollConfig = toml::from_str("").unwrap();
        assert_eq!(config, PollConfig::default());

        let config: PollConfig = toml::from_str("buffer_capacity = 4096").unwrap();
        assert_eq!(config.buffer_capacity, 4096);
    }
}
