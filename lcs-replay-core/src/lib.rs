#![warn(missing_docs)]
//! Buffered update scheduling for online learners.
//!
//! This crate decides which past transitions or pending corrections are kept,
//! how they are sampled or aggregated, and when they are replayed into a
//! learner. The learning algorithms themselves are supplied through the
//! [`Learner`] trait.
//!
//! * [`replay_buffer`] - bounded replay buffers, episodic staging and sampling
//! * [`ReplayOrchestrator`] - per-step admission and threshold-triggered replay
//! * [`DeferredCorrector`] - batched error-estimate corrections
//! * [`Trainer`] - explore and exploit episodes over an [`Env`]
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Agent, ConstantWeight, Env, ExperienceBufferBase, Learner, Policy, ReplayBufferBase, Step,
    Transition, WeightFn,
};

mod config;
pub use config::ReplayConfig;

mod corrector;
pub use corrector::{Correctable, DeferredCorrector, Effect, Population};

mod orchestrator;
pub use orchestrator::{EpisodeState, ReplayOrchestrator, ReplayOutcome};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};
