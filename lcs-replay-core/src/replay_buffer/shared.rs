//! A weighted replay buffer shared by several producers.
use super::{BatchSampler, WeightedReplayBuffer};
use crate::{error::ConfigError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// A [`WeightedReplayBuffer`] behind a mutex.
///
/// Every method holds the lock for the whole operation, so admission (evict and
/// append of the item/weight pair) and sampling (draw and read) are atomic with
/// respect to each other. Cloning the handle shares the same buffer.
pub struct SharedReplayBuffer<T> {
    inner: Arc<Mutex<WeightedReplayBuffer<T>>>,
}

impl<T> Clone for SharedReplayBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedReplayBuffer<T> {
    /// Creates an empty shared buffer.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(WeightedReplayBuffer::new(capacity)?)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, WeightedReplayBuffer<T>>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("Replay buffer mutex is poisoned"))
    }

    /// Admits an item, see [`WeightedReplayBuffer::admit`].
    pub fn admit(&self, item: T, weight: f32) -> Result<Option<(T, f32)>> {
        Ok(self.lock()?.admit(item, weight))
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if the buffer holds no item.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Draws a minibatch and returns copies of the drawn items in draw order.
    pub fn sample(&self, sampler: &mut BatchSampler, size: usize) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let buffer = self.lock()?;
        let ixs = sampler.sample(&*buffer, size)?;
        Ok(ixs
            .into_iter()
            .filter_map(|ix| buffer.get(ix).cloned())
            .collect())
    }

    /// Runs `f` with exclusive access to the buffer.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&mut WeightedReplayBuffer<T>) -> R) -> Result<R> {
        Ok(f(&mut *self.lock()?))
    }
}
