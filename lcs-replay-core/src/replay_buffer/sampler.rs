//! Minibatch sampling from replay buffers.
use crate::{error::SamplingError, ReplayBufferBase};
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    seq::index,
    Rng, SeedableRng,
};
use serde::{Deserialize, Serialize};

/// How a minibatch is drawn from a replay buffer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum SamplingMode {
    /// Independent draws where index `i` has probability `w_i / sum(w)`.
    /// Duplicates in a batch are expected.
    ///
    /// Over a buffer without weights every item has weight `1`.
    Weighted,

    /// Distinct indices drawn uniformly without replacement.
    Uniform,
}

impl Default for SamplingMode {
    fn default() -> Self {
        Self::Weighted
    }
}

/// Draws indices of minibatches from a [`ReplayBufferBase`].
///
/// The sampler owns a seeded random number generator, so a run is
/// reproducible given the seed and the sequence of buffer contents.
pub struct BatchSampler {
    mode: SamplingMode,
    rng: StdRng,
}

impl BatchSampler {
    /// Creates a sampler.
    pub fn new(mode: SamplingMode, seed: u64) -> Self {
        Self {
            mode,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the sampling mode.
    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Draws `size` indices into `buffer`, in draw order.
    ///
    /// A draw of `0` indices always succeeds with an empty batch.
    ///
    /// # Errors
    ///
    /// * [`SamplingError::EmptyBuffer`] if the buffer holds nothing.
    /// * [`SamplingError::InvalidWeight`] or [`SamplingError::ZeroTotalWeight`]
    ///   for weighted draws over negative, non-finite or all-zero weights.
    /// * [`SamplingError::NotEnoughItems`] for uniform draws with `size > len`.
    pub fn sample<B>(&mut self, buffer: &B, size: usize) -> Result<Vec<usize>, SamplingError>
    where
        B: ReplayBufferBase + ?Sized,
    {
        if size == 0 {
            return Ok(vec![]);
        }
        if buffer.is_empty() {
            return Err(SamplingError::EmptyBuffer);
        }

        match self.mode {
            SamplingMode::Weighted => self.sample_weighted(buffer, size),
            SamplingMode::Uniform => self.sample_uniform(buffer.len(), size),
        }
    }

    fn sample_weighted<B>(&mut self, buffer: &B, size: usize) -> Result<Vec<usize>, SamplingError>
    where
        B: ReplayBufferBase + ?Sized,
    {
        let weights = match buffer.weights() {
            Some(weights) => weights,
            None => {
                let n = buffer.len();
                return Ok((0..size).map(|_| self.rng.gen_range(0..n)).collect());
            }
        };

        if let Some((ix, &weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SamplingError::InvalidWeight { ix, weight });
        }
        let total = weights.iter().sum::<f32>();
        if total <= 0.0 {
            return Err(SamplingError::ZeroTotalWeight);
        }

        let dist = if total.is_finite() {
            WeightedIndex::<f32>::new(weights.iter())
        } else {
            // Finite weights whose sum overflows; the largest one is positive here
            let max = weights.iter().copied().fold(0.0f32, f32::max);
            WeightedIndex::<f32>::new(weights.iter().map(|w| w / max))
        }
        .map_err(|_| SamplingError::ZeroTotalWeight)?;
        Ok((0..size).map(|_| dist.sample(&mut self.rng)).collect())
    }

    fn sample_uniform(&mut self, len: usize, size: usize) -> Result<Vec<usize>, SamplingError> {
        if size > len {
            return Err(SamplingError::NotEnoughItems {
                requested: size,
                available: len,
            });
        }

        Ok(index::sample(&mut self.rng, len, size).into_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::replay_buffer::{ReplayBuffer, WeightedReplayBuffer};
    use std::collections::HashSet;

    fn buffer_with_weights(weights: &[f32]) -> WeightedReplayBuffer<usize> {
        let mut buffer = WeightedReplayBuffer::new(weights.len()).unwrap();
        for (i, &w) in weights.iter().enumerate() {
            buffer.admit(i, w);
        }
        buffer
    }

    #[test]
    fn test_single_positive_weight_is_always_drawn() {
        let buffer = buffer_with_weights(&[0.0, 0.0, 2.5, 0.0]);
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 7);

        for _ in 0..50 {
            assert_eq!(sampler.sample(&buffer, 5).unwrap(), vec![2; 5]);
        }
    }

    #[test]
    fn test_weighted_draws_follow_weights() {
        let buffer = buffer_with_weights(&[1.0, 3.0]);
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 42);

        let n = 20_000;
        let ixs = sampler.sample(&buffer, n).unwrap();
        let n1 = ixs.iter().filter(|&&ix| ix == 1).count();
        let p1 = n1 as f32 / n as f32;
        assert!((p1 - 0.75).abs() < 0.02, "p1 = {}", p1);
    }

    #[test]
    fn test_weighted_draws_allow_batch_larger_than_buffer() {
        let buffer = buffer_with_weights(&[1.0, 1.0]);
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 0);
        let ixs = sampler.sample(&buffer, 8).unwrap();
        assert_eq!(ixs.len(), 8);
        assert!(ixs.iter().all(|&ix| ix < 2));
    }

    #[test]
    fn test_weighted_sampling_rejects_bad_weights() {
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 0);

        let buffer = buffer_with_weights(&[0.0, 0.0]);
        assert_eq!(
            sampler.sample(&buffer, 1),
            Err(SamplingError::ZeroTotalWeight)
        );

        let buffer = buffer_with_weights(&[1.0, -0.5]);
        assert_eq!(
            sampler.sample(&buffer, 1),
            Err(SamplingError::InvalidWeight { ix: 1, weight: -0.5 })
        );

        let buffer = buffer_with_weights(&[f32::INFINITY]);
        assert!(matches!(
            sampler.sample(&buffer, 1),
            Err(SamplingError::InvalidWeight { ix: 0, .. })
        ));
    }

    #[test]
    fn test_uniform_draws_are_distinct() {
        let buffer = buffer_with_weights(&[1.0; 10]);
        let mut sampler = BatchSampler::new(SamplingMode::Uniform, 3);

        for k in 0..=10 {
            let ixs = sampler.sample(&buffer, k).unwrap();
            assert_eq!(ixs.len(), k);
            let distinct = ixs.iter().collect::<HashSet<_>>();
            assert_eq!(distinct.len(), k);
            assert!(ixs.iter().all(|&ix| ix < 10));
        }
    }

    #[test]
    fn test_weights_with_overflowing_sum_are_rescaled() {
        let buffer = buffer_with_weights(&[f32::MAX, 0.0, f32::MAX]);
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 5);

        let ixs = sampler.sample(&buffer, 200).unwrap();
        assert_eq!(ixs.len(), 200);
        assert!(ixs.iter().all(|&ix| ix == 0 || ix == 2));
        assert!(ixs.contains(&0) && ixs.contains(&2));
    }

    #[test]
    fn test_empty_batch_from_empty_buffer() {
        let buffer = WeightedReplayBuffer::<u8>::new(4).unwrap();
        for mode in [SamplingMode::Weighted, SamplingMode::Uniform] {
            let mut sampler = BatchSampler::new(mode, 0);
            assert_eq!(sampler.sample(&buffer, 0), Ok(vec![]));
        }
    }

    #[test]
    fn test_uniform_rejects_oversized_batch() {
        let buffer = buffer_with_weights(&[1.0; 3]);
        let mut sampler = BatchSampler::new(SamplingMode::Uniform, 3);
        assert_eq!(
            sampler.sample(&buffer, 4),
            Err(SamplingError::NotEnoughItems {
                requested: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_empty_buffer_is_rejected_in_both_modes() {
        let buffer = WeightedReplayBuffer::<u8>::new(4).unwrap();
        for mode in [SamplingMode::Weighted, SamplingMode::Uniform] {
            let mut sampler = BatchSampler::new(mode, 0);
            assert_eq!(sampler.sample(&buffer, 1), Err(SamplingError::EmptyBuffer));
        }
    }

    #[test]
    fn test_weighted_mode_over_unweighted_buffer() {
        let mut buffer = ReplayBuffer::new(3).unwrap();
        buffer.admit('x');
        buffer.admit('y');
        let mut sampler = BatchSampler::new(SamplingMode::Weighted, 11);
        let ixs = sampler.sample(&buffer, 100).unwrap();
        assert!(ixs.contains(&0) && ixs.contains(&1));
        assert!(ixs.iter().all(|&ix| ix < 2));
    }

    #[test]
    fn test_same_seed_same_draws() {
        let buffer = buffer_with_weights(&[0.2, 0.3, 0.5, 1.0]);
        let mut s1 = BatchSampler::new(SamplingMode::Weighted, 99);
        let mut s2 = BatchSampler::new(SamplingMode::Weighted, 99);
        assert_eq!(s1.sample(&buffer, 16), s2.sample(&buffer, 16));
    }
}
