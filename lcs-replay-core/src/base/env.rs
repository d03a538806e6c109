//! Environment.
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an MDP.
///
/// The replay core treats an environment as an opaque source of transition
/// fields; it never inspects observations or actions.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Action of the environment.
    type Act: Clone + Debug;

    /// Additional information in the [`Step`] object.
    type Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;
}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation after the action.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: E::Act, reward: f32, is_terminated: bool, info: E::Info) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            info,
        }
    }
}
