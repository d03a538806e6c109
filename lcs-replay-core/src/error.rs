//! Errors in the library.
use thiserror::Error;

/// Errors raised when a minibatch cannot be drawn from a replay buffer.
///
/// These errors are recoverable: [`ReplayOrchestrator`](crate::ReplayOrchestrator)
/// skips the replay cycle and continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// The buffer holds no item.
    #[error("Cannot sample from an empty replay buffer")]
    EmptyBuffer,

    /// Weighted sampling over weights summing to zero.
    #[error("Total weight of the replay buffer is not positive")]
    ZeroTotalWeight,

    /// Weighted sampling over a negative or non-finite weight.
    #[error("Invalid weight {weight} at index {ix}")]
    InvalidWeight {
        /// Index of the offending weight.
        ix: usize,

        /// The offending weight.
        weight: f32,
    },

    /// Sampling without replacement asked for more items than stored.
    #[error("Requested {requested} distinct items, but only {available} are available")]
    NotEnoughItems {
        /// Batch size.
        requested: usize,

        /// Number of items in the buffer.
        available: usize,
    },
}

/// Malformed configuration, rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter that must be strictly positive is zero.
    #[error("Configuration parameter `{0}` must be positive")]
    NonPositive(&'static str),

    /// Replay would start before a full batch can be drawn.
    #[error("min_samples_before_replay ({min_samples}) is smaller than samples_per_update ({batch_size})")]
    MinSamplesBelowBatch {
        /// `min_samples_before_replay`.
        min_samples: usize,

        /// `samples_per_update`.
        batch_size: usize,
    },

    /// Replay would never start.
    #[error("min_samples_before_replay ({min_samples}) exceeds buffer_capacity ({capacity})")]
    MinSamplesAboveCapacity {
        /// `min_samples_before_replay`.
        min_samples: usize,

        /// `buffer_capacity`.
        capacity: usize,
    },

    /// Learning rate outside of `[0, 1]`.
    #[error("error_learning_rate must be in [0, 1], got {0}")]
    InvalidLearningRate(f32),
}

/// Errors in accessing values of a [`Record`](crate::record::Record).
#[derive(Error, Debug)]
pub enum RecordError {
    /// Record key error.
    #[error("Record key error: {0}")]
    KeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    ValueTypeError(String),
}
