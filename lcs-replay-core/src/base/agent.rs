//! Agent.
use super::{Env, Learner, Policy};

/// A policy that also learns from replayed transitions.
pub trait Agent<E: Env>: Policy<E> + Learner<E::Obs, E::Act> {
    /// Set the agent to training mode.
    fn train(&mut self);

    /// Set the agent to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;
}
