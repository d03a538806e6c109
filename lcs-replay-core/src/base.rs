//! Core interfaces.
mod agent;
mod env;
mod learner;
mod policy;
mod replay_buffer;
mod transition;
mod weight;
pub use agent::Agent;
pub use env::{Env, Step};
pub use learner::Learner;
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use transition::Transition;
pub use weight::{ConstantWeight, WeightFn};
