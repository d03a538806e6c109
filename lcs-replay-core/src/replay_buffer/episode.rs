//! Per-episode staging of items before they reach a bounded replay buffer.
use super::WeightedReplayBuffer;
use crate::{ExperienceBufferBase, WeightFn};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{vec_deque, VecDeque};

/// Where [`EpisodeBuffer::push`] inserts a new item.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum StagingOrder {
    /// Append; items are drained oldest first.
    Chronological,

    /// Prepend; items are drained newest first.
    ///
    /// When the drained episode overflows the bounded buffer it is merged
    /// into, the newest transitions are admitted first and therefore evicted
    /// first, keeping the beginning of the episode.
    ReverseChronological,
}

impl Default for StagingOrder {
    fn default() -> Self {
        Self::Chronological
    }
}

/// An unbounded per-episode accumulator.
///
/// Created at the beginning of an episode, filled during it, and drained into
/// a bounded buffer at its end. Draining moves every item, one admission per
/// item in the stored order, and leaves the staging buffer empty.
#[derive(Debug, Clone)]
pub struct EpisodeBuffer<T> {
    order: StagingOrder,
    items: VecDeque<T>,
}

impl<T> EpisodeBuffer<T> {
    /// Creates an empty staging buffer.
    pub fn new(order: StagingOrder) -> Self {
        Self {
            order,
            items: VecDeque::new(),
        }
    }

    /// Returns the insertion order.
    pub fn order(&self) -> StagingOrder {
        self.order
    }

    /// Returns an iterator over the items in drain order.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Moves every item into `buffer` with [`ExperienceBufferBase::push`].
    ///
    /// Returns the number of items moved.
    pub fn drain_into<B>(&mut self, buffer: &mut B) -> Result<usize>
    where
        B: ExperienceBufferBase<Item = T> + ?Sized,
    {
        let n = self.items.len();
        for item in self.items.drain(..) {
            buffer.push(item)?;
        }
        Ok(n)
    }

    /// Moves every item out as one trial, in drain order.
    ///
    /// Used to store whole episodes in a buffer of trials and replay them
    /// with [`Learner::replay_trial`](crate::Learner::replay_trial).
    pub fn drain_trial(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Moves every item into a weighted buffer, computing each weight just
    /// before the item is admitted.
    ///
    /// If `weight_fn` fails, the error is returned and the items not yet
    /// admitted stay in the staging buffer.
    pub fn drain_into_weighted<W>(
        &mut self,
        buffer: &mut WeightedReplayBuffer<T>,
        weight_fn: &W,
    ) -> Result<usize>
    where
        W: WeightFn<T> + ?Sized,
    {
        let mut n = 0;
        while let Some(item) = self.items.pop_front() {
            let weight = match weight_fn.weight(buffer, &item) {
                Ok(weight) => weight,
                Err(e) => {
                    self.items.push_front(item);
                    return Err(e);
                }
            };
            buffer.admit(item, weight);
            n += 1;
        }
        Ok(n)
    }
}

impl<T> ExperienceBufferBase for EpisodeBuffer<T> {
    type Item = T;

    fn push(&mut self, tr: T) -> Result<()> {
        match self.order {
            StagingOrder::Chronological => self.items.push_back(tr),
            StagingOrder::ReverseChronological => self.items.push_front(tr),
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        replay_buffer::{ReplayBuffer, WeightedReplayBuffer},
        ConstantWeight,
    };
    use anyhow::bail;

    fn staged(order: StagingOrder, items: &str) -> EpisodeBuffer<char> {
        let mut staging = EpisodeBuffer::new(order);
        for c in items.chars() {
            staging.push(c).unwrap();
        }
        staging
    }

    #[test]
    fn test_chronological_drain_keeps_latest() -> Result<()> {
        let mut staging = staged(StagingOrder::Chronological, "XYZ");
        assert_eq!(staging.iter().collect::<String>(), "XYZ");

        let mut buffer = ReplayBuffer::new(2)?;
        assert_eq!(staging.drain_into(&mut buffer)?, 3);
        assert!(staging.is_empty());
        assert_eq!(buffer.iter().collect::<String>(), "YZ");
        Ok(())
    }

    #[test]
    fn test_reverse_chronological_drain_keeps_earliest() -> Result<()> {
        let mut staging = staged(StagingOrder::ReverseChronological, "XYZ");
        assert_eq!(staging.iter().collect::<String>(), "ZYX");

        // Z, Y, X are admitted in this order; Z is evicted by X
        let mut buffer = WeightedReplayBuffer::new(2)?;
        staging.drain_into(&mut buffer)?;
        assert!(staging.is_empty());
        assert_eq!(buffer.iter().collect::<String>(), "YX");
        Ok(())
    }

    #[test]
    fn test_drain_trial_keeps_drain_order() {
        let mut staging = staged(StagingOrder::ReverseChronological, "abc");
        assert_eq!(staging.drain_trial(), vec!['c', 'b', 'a']);
        assert!(staging.is_empty());
        assert!(staging.drain_trial().is_empty());
    }

    #[test]
    fn test_weighted_drain_sees_growing_buffer() -> Result<()> {
        let mut staging = staged(StagingOrder::Chronological, "abc");
        let mut buffer = WeightedReplayBuffer::new(5)?;
        buffer.admit('z', 0.5);

        let by_len = |b: &WeightedReplayBuffer<char>, _: &char| -> Result<f32> { Ok(b.len() as f32) };
        assert_eq!(staging.drain_into_weighted(&mut buffer, &by_len)?, 3);

        let weights = buffer.iter_weighted().map(|(_, w)| w).collect::<Vec<_>>();
        assert_eq!(weights, vec![0.5, 1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_weighted_drain_with_constant_weight() -> Result<()> {
        let mut staging = staged(StagingOrder::ReverseChronological, "ab");
        let mut buffer = WeightedReplayBuffer::new(5)?;
        staging.drain_into_weighted(&mut buffer, &ConstantWeight(2.0))?;
        assert_eq!(
            buffer.iter_weighted().collect::<Vec<_>>(),
            vec![(&'b', 2.0), (&'a', 2.0)]
        );
        Ok(())
    }

    #[test]
    fn test_failing_weight_fn_keeps_remaining_items() -> Result<()> {
        let mut staging = staged(StagingOrder::Chronological, "abc");
        let mut buffer = WeightedReplayBuffer::new(5)?;

        let fail_on_b = |_: &WeightedReplayBuffer<char>, c: &char| -> Result<f32> {
            if *c == 'b' {
                bail!("cannot weight {}", c);
            }
            Ok(1.0)
        };
        assert!(staging.drain_into_weighted(&mut buffer, &fail_on_b).is_err());
        assert_eq!(buffer.iter().collect::<String>(), "a");
        assert_eq!(staging.iter().collect::<String>(), "bc");
        Ok(())
    }
}
