//! Importance weighting of admitted items.
use crate::replay_buffer::WeightedReplayBuffer;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Computes the importance weight of an item about to be admitted.
///
/// The function sees the buffer as it is before admission. It must not have
/// side effects; an error aborts the orchestration that called it.
///
/// Closures of type `Fn(&WeightedReplayBuffer<T>, &T) -> Result<f32>`
/// implement this trait.
pub trait WeightFn<T> {
    /// Returns the weight of `item`.
    fn weight(&self, buffer: &WeightedReplayBuffer<T>, item: &T) -> Result<f32>;
}

impl<T, F> WeightFn<T> for F
where
    F: Fn(&WeightedReplayBuffer<T>, &T) -> Result<f32>,
{
    fn weight(&self, buffer: &WeightedReplayBuffer<T>, item: &T) -> Result<f32> {
        self(buffer, item)
    }
}

/// Assigns the same weight to every item.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub struct ConstantWeight(pub f32);

impl Default for ConstantWeight {
    fn default() -> Self {
        Self(1.0)
    }
}

impl<T> WeightFn<T> for ConstantWeight {
    fn weight(&self, _buffer: &WeightedReplayBuffer<T>, _item: &T) -> Result<f32> {
        Ok(self.0)
    }
}
