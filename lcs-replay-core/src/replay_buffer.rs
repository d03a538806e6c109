//! Bounded replay buffers, episodic staging and minibatch sampling.
//!
//! # Key Components
//!
//! - [`WeightedReplayBuffer`]: fixed-capacity FIFO store with parallel importance weights
//! - [`ReplayBuffer`]: the same store without weights
//! - [`EpisodeBuffer`]: per-episode staging, merged into a bounded buffer at episode end
//! - [`BatchSampler`]: weighted-with-replacement or uniform-without-replacement draws
//! - [`SharedReplayBuffer`]: a weighted buffer guarded by a mutex for several producers
//!
//! # Examples
//!
//! ```rust
//! use lcs_replay_core::replay_buffer::{BatchSampler, SamplingMode, WeightedReplayBuffer};
//!
//! let mut buffer = WeightedReplayBuffer::new(3).unwrap();
//! for (item, weight) in [('a', 1.0), ('b', 1.0), ('c', 1.0), ('d', 1.0)] {
//!     buffer.admit(item, weight);
//! }
//! assert_eq!(buffer.iter().copied().collect::<String>(), "bcd");
//!
//! let mut sampler = BatchSampler::new(SamplingMode::Uniform, 42);
//! let ixs = sampler.sample(&buffer, 3).unwrap();
//! assert_eq!(ixs.len(), 3);
//! ```
mod base;
mod episode;
mod sampler;
mod shared;
pub use base::{ReplayBuffer, WeightedReplayBuffer};
pub use episode::{EpisodeBuffer, StagingOrder};
pub use sampler::{BatchSampler, SamplingMode};
pub use shared::SharedReplayBuffer;
