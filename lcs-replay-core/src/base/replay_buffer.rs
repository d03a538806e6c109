//! Replay buffer interface.
//!
//! Buffers are split into two traits. [`ExperienceBufferBase`] is the admission
//! side, shared by bounded replay buffers and per-episode staging buffers.
//! [`ReplayBufferBase`] is the read side used by
//! [`BatchSampler`](crate::replay_buffer::BatchSampler).
use anyhow::Result;
use std::collections::VecDeque;

/// Interface for buffers that store experiences.
///
/// # Examples
///
/// ```ignore
/// struct SimpleBuffer<T> {
///     items: Vec<T>,
/// }
///
/// impl<T> ExperienceBufferBase for SimpleBuffer<T> {
///     type Item = T;
///
///     fn push(&mut self, tr: T) -> Result<()> {
///         self.items.push(tr);
///         Ok(())
///     }
///
///     fn len(&self) -> usize {
///         self.items.len()
///     }
/// }
/// ```
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes an item into the buffer.
    ///
    /// Weighted buffers admit the item with weight `1`.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of items in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no item.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for bounded buffers from which minibatches are drawn.
pub trait ReplayBufferBase: ExperienceBufferBase {
    /// Maximum number of items the buffer keeps.
    fn capacity(&self) -> usize;

    /// Returns the item at index `ix`, where index 0 is the oldest item.
    fn get(&self, ix: usize) -> Option<&Self::Item>;

    /// Importance weights parallel to the items, or `None` for buffers
    /// without weights.
    fn weights(&self) -> Option<&VecDeque<f32>>;

    /// Removes every item.
    fn clear(&mut self);
}
