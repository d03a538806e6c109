//! Fixed-capacity FIFO replay buffers.
use crate::{error::ConfigError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::trace;
use std::collections::{vec_deque, VecDeque};

/// A fixed-capacity replay buffer with an importance weight per item.
///
/// Items are kept in admission order. When the buffer is full, admitting a new
/// item first evicts the oldest item (index 0) together with its weight, so
/// `items.len() == weights.len() <= capacity` holds after every operation.
///
/// Weights may be any real value. Weighted sampling over the buffer fails
/// unless the weights are non-negative and sum to a positive value.
///
/// # Examples
///
/// ```rust
/// use lcs_replay_core::{replay_buffer::WeightedReplayBuffer, ExperienceBufferBase};
///
/// let mut buffer = WeightedReplayBuffer::new(2).unwrap();
/// buffer.admit("a", 1.0);
/// buffer.admit("b", 0.5);
/// let evicted = buffer.admit("c", 2.0);
/// assert_eq!(evicted, Some(("a", 1.0)));
/// assert_eq!(buffer.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct WeightedReplayBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
    weights: VecDeque<f32>,
}

impl<T> WeightedReplayBuffer<T> {
    /// Creates an empty buffer. A zero capacity is rejected.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::NonPositive("buffer_capacity"));
        }

        Ok(Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
            weights: VecDeque::with_capacity(capacity),
        })
    }

    /// Admits an item with the given weight.
    ///
    /// Returns the evicted oldest item and its weight if the buffer was full.
    pub fn admit(&mut self, item: T, weight: f32) -> Option<(T, f32)> {
        let evicted = if self.items.len() >= self.capacity {
            trace!("Evict the oldest item of a full buffer (capacity {})", self.capacity);
            self.items.pop_front().zip(self.weights.pop_front())
        } else {
            None
        };

        self.items.push_back(item);
        self.weights.push_back(weight);
        debug_assert_eq!(self.items.len(), self.weights.len());
        debug_assert!(self.items.len() <= self.capacity);

        evicted
    }

    /// Returns an iterator over the items, oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns an iterator over `(item, weight)` pairs, oldest first.
    pub fn iter_weighted(&self) -> impl Iterator<Item = (&T, f32)> {
        self.items.iter().zip(self.weights.iter().copied())
    }

    /// Sum of the weights of all items.
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

impl<T> ExperienceBufferBase for WeightedReplayBuffer<T> {
    type Item = T;

    /// Admits the item with weight `1`.
    fn push(&mut self, tr: T) -> Result<()> {
        self.admit(tr, 1.0);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> ReplayBufferBase for WeightedReplayBuffer<T> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get(&self, ix: usize) -> Option<&T> {
        self.items.get(ix)
    }

    fn weights(&self) -> Option<&VecDeque<f32>> {
        Some(&self.weights)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.weights.clear();
    }
}

/// A fixed-capacity replay buffer without weights.
///
/// Used by learners that have no use for importance weighting. Eviction and
/// admission follow [`WeightedReplayBuffer`].
#[derive(Debug, Clone)]
pub struct ReplayBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> ReplayBuffer<T> {
    /// Creates an empty buffer. A zero capacity is rejected.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::NonPositive("buffer_capacity"));
        }

        Ok(Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        })
    }

    /// Admits an item, returning the evicted oldest item if the buffer was full.
    pub fn admit(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        debug_assert!(self.items.len() <= self.capacity);

        evicted
    }

    /// Returns an iterator over the items, oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> ExperienceBufferBase for ReplayBuffer<T> {
    type Item = T;

    fn push(&mut self, tr: T) -> Result<()> {
        self.admit(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> ReplayBufferBase for ReplayBuffer<T> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get(&self, ix: usize) -> Option<&T> {
        self.items.get(ix)
    }

    fn weights(&self) -> Option<&VecDeque<f32>> {
        None
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
