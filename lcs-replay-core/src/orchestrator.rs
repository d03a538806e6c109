//! Replay-driven update scheduling.
use crate::{
    error::{ConfigError, SamplingError},
    record::{Record, RecordValue},
    replay_buffer::{BatchSampler, EpisodeBuffer, WeightedReplayBuffer},
    ConstantWeight, ExperienceBufferBase, Learner, ReplayBufferBase, ReplayConfig, Transition,
    WeightFn,
};
use anyhow::Result;
use log::{debug, warn};

/// Lifecycle of the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// Steps are being observed.
    Running,

    /// The last episode has ended and its staged transitions were merged.
    Terminated,
}

/// Result of one replay cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOutcome {
    /// Occupancy is below `min_samples_before_replay`.
    NotReady,

    /// The sampler failed; the cycle was skipped.
    Skipped(SamplingError),

    /// The given number of replay updates were applied.
    Replayed(usize),
}

impl ReplayOutcome {
    /// Number of replay updates applied in the cycle.
    pub fn n_replayed(&self) -> usize {
        match self {
            Self::Replayed(n) => *n,
            _ => 0,
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Admits observed transitions into a bounded replay buffer and replays
/// minibatches through a [`Learner`].
///
/// # Step cycle
///
/// For every observed step, [`ReplayOrchestrator::observe`]:
///
/// 1. Builds a [`Transition`] stamped with the orchestrator's step counter.
/// 2. Without episodic staging, computes `weight = weight_fn(buffer, transition)`,
///    admits the transition into the global buffer and, once the buffer holds at
///    least `min_samples_before_replay` transitions, draws `samples_per_update`
///    indices and calls [`Learner::replay_update`] for each drawn transition in
///    draw order.
/// 3. With episodic staging, pushes the transition into the episode's
///    [`EpisodeBuffer`]. Nothing is replayed mid-episode.
/// 4. If the transition is terminal, ends the episode with
///    [`ReplayOrchestrator::end_episode`]: staged transitions are weighted and
///    merged into the global buffer, then one replay cycle runs.
///
/// ```mermaid
/// graph LR
///     A[observe]-->|Transition|B{staging?}
///     B -->|no|C[WeightedReplayBuffer]
///     B -->|yes|D[EpisodeBuffer]
///     D -->|end_episode|C
///     C -->|BatchSampler|E[Learner::replay_update]
/// ```
///
/// # Errors
///
/// Errors of the weight function and of the learner are propagated. Sampling
/// errors, for example after [`ReplayOrchestrator::clear_buffer`], skip the
/// replay cycle with a warning.
pub struct ReplayOrchestrator<O, A, W = ConstantWeight> {
    min_samples: usize,
    batch_size: usize,
    buffer: WeightedReplayBuffer<Transition<O, A>>,
    staging: Option<EpisodeBuffer<Transition<O, A>>>,
    sampler: BatchSampler,
    weight_fn: W,
    time: usize,
    state: EpisodeState,
}

impl<O, A> ReplayOrchestrator<O, A, ConstantWeight> {
    /// Builds an orchestrator weighting every transition with `1`.
    pub fn build(config: &ReplayConfig) -> Result<Self, ConfigError> {
        Self::build_with_weight_fn(config, ConstantWeight::default())
    }
}

impl<O, A, W> ReplayOrchestrator<O, A, W>
where
    W: WeightFn<Transition<O, A>>,
{
    /// Builds an orchestrator with the given weighting function.
    pub fn build_with_weight_fn(config: &ReplayConfig, weight_fn: W) -> Result<Self, ConfigError> {
        config.validate_replay()?;

        Ok(Self {
            min_samples: config.min_samples_before_replay,
            batch_size: config.samples_per_update,
            buffer: WeightedReplayBuffer::new(config.buffer_capacity)?,
            staging: match config.episodic_staging {
                true => Some(EpisodeBuffer::new(config.staging_order)),
                false => None,
            },
            sampler: BatchSampler::new(config.sampling_mode, config.seed),
            weight_fn,
            time: 0,
            state: EpisodeState::Terminated,
        })
    }

    /// Starts a new episode.
    ///
    /// Transitions left in the staging buffer by an episode that was never
    /// ended are discarded.
    pub fn begin_episode(&mut self) {
        if let Some(staging) = self.staging.as_mut() {
            if !staging.is_empty() {
                warn!(
                    "Discard {} staged transitions of an episode that was not ended",
                    staging.len()
                );
                *staging = EpisodeBuffer::new(staging.order());
            }
        }
        self.state = EpisodeState::Running;
    }

    /// Processes one observed step.
    ///
    /// The returned record holds `buffer_size`, `replayed` and, if a replay
    /// cycle was skipped, `replay_skipped`.
    pub fn observe<L>(
        &mut self,
        learner: &mut L,
        obs: O,
        act: A,
        reward: f32,
        next_obs: O,
        is_terminated: bool,
    ) -> Result<Record>
    where
        L: Learner<O, A> + ?Sized,
    {
        if self.state == EpisodeState::Terminated {
            self.begin_episode();
        }

        let tr = Transition::new(obs, act, reward, next_obs, is_terminated, self.time);
        self.time += 1;

        let outcome = match self.staging.as_mut() {
            Some(staging) => {
                staging.push(tr)?;
                ReplayOutcome::NotReady
            }
            None => {
                let weight = self.weight_fn.weight(&self.buffer, &tr)?;
                self.buffer.admit(tr, weight);
                self.replay(learner)?
            }
        };

        let mut record = self.outcome_record(&outcome);
        if is_terminated {
            let record_end = self.end_episode(learner)?;
            let replayed = outcome.n_replayed() as f32 + record_end.get_scalar("replayed")?;
            record.merge_inplace(record_end);
            record.insert("replayed", RecordValue::Scalar(replayed));
        }

        Ok(record)
    }

    /// Ends the current episode.
    ///
    /// With episodic staging, merges the staged transitions into the global
    /// buffer and runs one replay cycle. Without staging, only the episode
    /// state changes.
    pub fn end_episode<L>(&mut self, learner: &mut L) -> Result<Record>
    where
        L: Learner<O, A> + ?Sized,
    {
        let outcome = match self.staging.as_mut() {
            Some(staging) => {
                let n = staging.drain_into_weighted(&mut self.buffer, &self.weight_fn)?;
                debug!(
                    "Merged {} staged transitions, buffer size = {}",
                    n,
                    self.buffer.len()
                );
                self.replay(learner)?
            }
            None => ReplayOutcome::NotReady,
        };
        self.state = EpisodeState::Terminated;

        Ok(self.outcome_record(&outcome))
    }

    /// Runs one replay cycle if the buffer is ready.
    ///
    /// Drawn transitions are replayed one at a time in draw order.
    pub fn replay<L>(&mut self, learner: &mut L) -> Result<ReplayOutcome>
    where
        L: Learner<O, A> + ?Sized,
    {
        if !self.is_ready_to_replay() {
            return Ok(ReplayOutcome::NotReady);
        }

        let ixs = match self.sampler.sample(&self.buffer, self.batch_size) {
            Ok(ixs) => ixs,
            Err(e) => {
                warn!("Skip replay: {}", e);
                return Ok(ReplayOutcome::Skipped(e));
            }
        };

        for &ix in ixs.iter() {
            if let Some(tr) = self.buffer.get(ix) {
                learner.replay_update(tr)?;
            }
        }

        Ok(ReplayOutcome::Replayed(ixs.len()))
    }

    fn outcome_record(&self, outcome: &ReplayOutcome) -> Record {
        let mut record = Record::from_slice(&[
            ("buffer_size", RecordValue::Scalar(self.buffer.len() as _)),
            ("replayed", RecordValue::Scalar(outcome.n_replayed() as _)),
        ]);
        if let ReplayOutcome::Skipped(_) = outcome {
            record.insert("replay_skipped", RecordValue::Scalar(1.0));
        }
        record
    }
}

impl<O, A, W> ReplayOrchestrator<O, A, W> {
    /// Number of transitions in the global buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the global buffer holds at least
    /// `min_samples_before_replay` transitions.
    pub fn is_ready_to_replay(&self) -> bool {
        self.buffer.len() >= self.min_samples
    }

    /// The global buffer.
    pub fn buffer(&self) -> &WeightedReplayBuffer<Transition<O, A>> {
        &self.buffer
    }

    /// Number of transitions staged in the current episode.
    pub fn staged_len(&self) -> usize {
        self.staging.as_ref().map_or(0, |s| s.len())
    }

    /// Empties the global buffer.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Value of the step counter, the time stamp of the next transition.
    pub fn time(&self) -> usize {
        self.time
    }

    /// State of the current episode.
    pub fn state(&self) -> EpisodeState {
        self.state
    }
}
