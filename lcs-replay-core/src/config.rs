//! Configuration of the replay core.
//!
//! [`ReplayConfig`] carries every option recognized by
//! [`ReplayOrchestrator`](crate::ReplayOrchestrator) and
//! [`DeferredCorrector`](crate::DeferredCorrector). It is validated when those
//! objects are built, so a malformed configuration is rejected before the
//! first step.
use crate::{
    error::ConfigError,
    replay_buffer::{SamplingMode, StagingOrder},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of buffering, replay and deferred correction.
///
/// # Examples
///
/// ```rust
/// use lcs_replay_core::{replay_buffer::StagingOrder, ReplayConfig};
///
/// let config = ReplayConfig::default()
///     .buffer_capacity(500)
///     .min_samples_before_replay(32)
///     .samples_per_update(8)
///     .episodic_staging(true)
///     .staging_order(StagingOrder::ReverseChronological);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ReplayConfig {
    /// Maximum number of transitions kept in the replay buffer.
    pub buffer_capacity: usize,

    /// Occupancy from which replay starts.
    pub min_samples_before_replay: usize,

    /// Number of transitions drawn per replay cycle.
    pub samples_per_update: usize,

    /// If `true`, transitions are staged per episode and merged into the
    /// replay buffer when the episode ends.
    pub episodic_staging: bool,

    /// Insertion order of the staging buffer.
    pub staging_order: StagingOrder,

    /// Number of pending corrections that triggers a flush.
    pub correction_threshold: usize,

    /// Step size of the error estimate update.
    pub error_learning_rate: f32,

    /// How minibatches are drawn.
    pub sampling_mode: SamplingMode,

    /// Random seed of the sampler.
    pub seed: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 10000,
            min_samples_before_replay: 1000,
            samples_per_update: 3,
            episodic_staging: false,
            staging_order: StagingOrder::Chronological,
            correction_threshold: 4,
            error_learning_rate: 0.05,
            sampling_mode: SamplingMode::Weighted,
            seed: 42,
        }
    }
}

impl ReplayConfig {
    /// Sets the capacity of the replay buffer.
    pub fn buffer_capacity(mut self, v: usize) -> Self {
        self.buffer_capacity = v;
        self
    }

    /// Sets the occupancy from which replay starts.
    pub fn min_samples_before_replay(mut self, v: usize) -> Self {
        self.min_samples_before_replay = v;
        self
    }

    /// Sets the number of transitions drawn per replay cycle.
    pub fn samples_per_update(mut self, v: usize) -> Self {
        self.samples_per_update = v;
        self
    }

    /// Enables or disables per-episode staging.
    pub fn episodic_staging(mut self, v: bool) -> Self {
        self.episodic_staging = v;
        self
    }

    /// Sets the insertion order of the staging buffer.
    pub fn staging_order(mut self, v: StagingOrder) -> Self {
        self.staging_order = v;
        self
    }

    /// Sets the number of pending corrections that triggers a flush.
    pub fn correction_threshold(mut self, v: usize) -> Self {
        self.correction_threshold = v;
        self
    }

    /// Sets the step size of the error estimate update.
    pub fn error_learning_rate(mut self, v: f32) -> Self {
        self.error_learning_rate = v;
        self
    }

    /// Sets the sampling mode.
    pub fn sampling_mode(mut self, v: SamplingMode) -> Self {
        self.sampling_mode = v;
        self
    }

    /// Sets the random seed of the sampler.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the replay options.
    pub fn validate_replay(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::NonPositive("buffer_capacity"));
        }
        if self.samples_per_update == 0 {
            return Err(ConfigError::NonPositive("samples_per_update"));
        }
        if self.min_samples_before_replay < self.samples_per_update {
            return Err(ConfigError::MinSamplesBelowBatch {
                min_samples: self.min_samples_before_replay,
                batch_size: self.samples_per_update,
            });
        }
        if self.min_samples_before_replay > self.buffer_capacity {
            return Err(ConfigError::MinSamplesAboveCapacity {
                min_samples: self.min_samples_before_replay,
                capacity: self.buffer_capacity,
            });
        }
        Ok(())
    }

    /// Checks the correction options.
    pub fn validate_correction(&self) -> Result<(), ConfigError> {
        if self.correction_threshold == 0 {
            return Err(ConfigError::NonPositive("correction_threshold"));
        }
        let lr = self.error_learning_rate;
        if !(0.0..=1.0).contains(&lr) {
            return Err(ConfigError::InvalidLearningRate(lr));
        }
        Ok(())
    }

    /// Checks every option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_replay()?;
        self.validate_correction()
    }

    /// Loads [`ReplayConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ReplayConfig`] to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
