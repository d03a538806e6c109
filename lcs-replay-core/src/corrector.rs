//! Batched correction of error estimates.
//!
//! A learner that predicts the effect of an action and observes a different
//! outcome queues a correction instead of updating the predicting entity right
//! away. When `correction_threshold` corrections are pending, they are applied
//! in one batch, in enqueue order, each with
//!
//! ```text
//! error <- error + error_learning_rate * (distance(effect, target) - error)
//! ```
//!
//! Corrections whose prediction already matches the observation are never
//! queued.
use crate::{error::ConfigError, ReplayConfig};
use log::debug;
use std::{
    collections::HashMap,
    fmt::Debug,
    hash::{BuildHasher, Hash},
};

/// An anticipated effect that can be compared with an observed one.
pub trait Effect: PartialEq + Clone {
    /// Distance between two effects, `0` for equal effects.
    fn distance(&self, other: &Self) -> f32;
}

impl Effect for f32 {
    fn distance(&self, other: &Self) -> f32 {
        (self - other).abs()
    }
}

impl Effect for f64 {
    fn distance(&self, other: &Self) -> f32 {
        (self - other).abs() as f32
    }
}

/// Fraction of mismatching positions. Sequences of different lengths are at
/// distance `1`.
fn mismatch_ratio<T: PartialEq>(
    a: impl ExactSizeIterator<Item = T>,
    b: impl ExactSizeIterator<Item = T>,
) -> f32 {
    let n = a.len();
    if n != b.len() {
        return 1.0;
    }
    if n == 0 {
        return 0.0;
    }
    let mismatches = a.zip(b).filter(|(x, y)| x != y).count();
    mismatches as f32 / n as f32
}

impl Effect for String {
    fn distance(&self, other: &Self) -> f32 {
        let a = self.chars().collect::<Vec<_>>();
        let b = other.chars().collect::<Vec<_>>();
        mismatch_ratio(a.iter(), b.iter())
    }
}

impl<T: PartialEq + Clone> Effect for Vec<T> {
    fn distance(&self, other: &Self) -> f32 {
        mismatch_ratio(self.iter(), other.iter())
    }
}

/// An entity whose anticipated effect carries an error estimate,
/// such as a classifier.
pub trait Correctable {
    /// Type of the anticipated effect.
    type Effect: Effect;

    /// The effect the entity currently anticipates.
    fn effect(&self) -> &Self::Effect;

    /// Current error estimate.
    fn error(&self) -> f32;

    /// Overwrites the error estimate.
    fn set_error(&mut self, error: f32);
}

/// A collection of [`Correctable`] entities addressed by key.
///
/// Pending corrections hold keys, never the entities themselves.
pub trait Population {
    /// Key of an entity.
    type Key: Clone + Debug;

    /// Entity type.
    type Entity: Correctable;

    /// Returns the entity of the given key, if it is still in the population.
    fn entity_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Entity>;
}

impl<C: Correctable> Population for Vec<C> {
    type Key = usize;
    type Entity = C;

    fn entity_mut(&mut self, key: &usize) -> Option<&mut C> {
        self.get_mut(*key)
    }
}

impl<K, C, S> Population for HashMap<K, C, S>
where
    K: Eq + Hash + Clone + Debug,
    C: Correctable,
    S: BuildHasher,
{
    type Key = K;
    type Entity = C;

    fn entity_mut(&mut self, key: &K) -> Option<&mut C> {
        self.get_mut(key)
    }
}

/// Accumulates corrections and applies them in batches.
///
/// `K` is the key of an entity in a [`Population`], `F` the effect type.
///
/// # Examples
///
/// ```rust
/// use lcs_replay_core::{Correctable, DeferredCorrector};
///
/// struct Rule {
///     effect: f32,
///     error: f32,
/// }
///
/// impl Correctable for Rule {
///     type Effect = f32;
///     fn effect(&self) -> &f32 { &self.effect }
///     fn error(&self) -> f32 { self.error }
///     fn set_error(&mut self, error: f32) { self.error = error; }
/// }
///
/// let mut population = vec![Rule { effect: 1.0, error: 0.0 }, Rule { effect: 2.0, error: 0.0 }];
/// let mut corrector = DeferredCorrector::new(2, 0.5).unwrap();
///
/// // A matching prediction is not queued
/// corrector.enqueue(&mut population, 0, &1.0, 1.0);
/// assert_eq!(corrector.pending_len(), 0);
///
/// corrector.enqueue(&mut population, 0, &1.0, 3.0);
/// let n = corrector.enqueue(&mut population, 1, &2.0, 2.5);
/// assert_eq!(n, 2);
/// assert_eq!(population[0].error, 1.0);
/// assert_eq!(population[1].error, 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct DeferredCorrector<K, F> {
    threshold: usize,
    learning_rate: f32,
    pending: Vec<(K, F)>,
}

impl<K, F> DeferredCorrector<K, F>
where
    K: Clone + Debug,
    F: Effect,
{
    /// Creates a corrector.
    pub fn new(threshold: usize, learning_rate: f32) -> Result<Self, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::NonPositive("correction_threshold"));
        }
        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(ConfigError::InvalidLearningRate(learning_rate));
        }

        Ok(Self {
            threshold,
            learning_rate,
            pending: Vec::with_capacity(threshold),
        })
    }

    /// Creates a corrector with `correction_threshold` and
    /// `error_learning_rate` of the given configuration.
    pub fn build(config: &ReplayConfig) -> Result<Self, ConfigError> {
        config.validate_correction()?;
        Self::new(config.correction_threshold, config.error_learning_rate)
    }

    /// Queues a correction of the entity `key` towards `observed`.
    ///
    /// Nothing is queued if `predicted == observed`. If the queue reaches the
    /// threshold, it is flushed into `population` immediately.
    ///
    /// Returns the number of corrections applied by this call.
    pub fn enqueue<P>(&mut self, population: &mut P, key: K, predicted: &F, observed: F) -> usize
    where
        P: Population<Key = K> + ?Sized,
        P::Entity: Correctable<Effect = F>,
    {
        if *predicted == observed {
            return 0;
        }

        self.pending.push((key, observed));
        if self.pending.len() >= self.threshold {
            self.flush(population)
        } else {
            0
        }
    }

    /// Applies every pending correction in enqueue order and empties the queue.
    ///
    /// Corrections of entities no longer in the population are dropped.
    /// Returns the number of corrections applied.
    pub fn flush<P>(&mut self, population: &mut P) -> usize
    where
        P: Population<Key = K> + ?Sized,
        P::Entity: Correctable<Effect = F>,
    {
        let lr = self.learning_rate;
        let mut n = 0;

        for (key, target) in self.pending.drain(..) {
            match population.entity_mut(&key) {
                Some(entity) => {
                    let error = entity.error();
                    let distance = entity.effect().distance(&target);
                    entity.set_error(error + lr * (distance - error));
                    n += 1;
                }
                None => debug!("Drop the correction of {:?}, not in the population", key),
            }
        }
        debug!("Flushed {} corrections", n);

        n
    }

    /// Number of pending corrections.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no correction is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending corrections that triggers a flush.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Step size of the error estimate update.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Pending `(key, target)` pairs in enqueue order.
    pub fn pending(&self) -> impl Iterator<Item = &(K, F)> {
        self.pending.iter()
    }
}
