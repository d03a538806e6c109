//! Run episodes of an [`Agent`] on an [`Env`].
mod config;
use crate::{
    record::{Record, RecordValue, Recorder},
    Agent, ConstantWeight, Env, ReplayConfig, ReplayOrchestrator, Transition, WeightFn,
};
use anyhow::{anyhow, Result};
pub use config::TrainerConfig;
use log::info;

/// Drives episodes and feeds explore steps to a [`ReplayOrchestrator`].
///
/// # Episode loop
///
/// 1. Reset [`Env`] and start an episode of the orchestrator.
/// 2. Sample an action from the agent and apply it to the environment.
/// 3. In an explore episode, pass the transition to
///    [`ReplayOrchestrator::observe`], which admits it and replays
///    minibatches into the agent. Exploit episodes skip this step.
/// 4. Repeat from 2 until a terminal step or `max_steps_per_episode`.
///
/// Every episode produces a [`Record`] with `steps`, `last_reward`,
/// `replayed`, `buffer_size` and `mode`.
pub struct Trainer<E, W = ConstantWeight>
where
    E: Env,
{
    env: E,
    orchestrator: ReplayOrchestrator<E::Obs, E::Act, W>,
    config: TrainerConfig,
}

impl<E> Trainer<E, ConstantWeight>
where
    E: Env,
{
    /// Constructs a trainer weighting every transition with `1`.
    pub fn build(
        config: TrainerConfig,
        env_config: &E::Config,
        replay_config: &ReplayConfig,
    ) -> Result<Self> {
        Self::build_with_weight_fn(config, env_config, replay_config, ConstantWeight::default())
    }
}

impl<E, W> Trainer<E, W>
where
    E: Env,
    W: WeightFn<Transition<E::Obs, E::Act>>,
{
    /// Constructs a trainer with the given weighting function.
    ///
    /// Fails if `replay_config` is malformed or its seed exceeds `i64::MAX`.
    pub fn build_with_weight_fn(
        config: TrainerConfig,
        env_config: &E::Config,
        replay_config: &ReplayConfig,
        weight_fn: W,
    ) -> Result<Self> {
        let seed = i64::try_from(replay_config.seed)
            .map_err(|_| anyhow!("Seed {} does not fit the environment seed", replay_config.seed))?;
        let env = E::build(env_config, seed)?;
        let orchestrator = ReplayOrchestrator::build_with_weight_fn(replay_config, weight_fn)?;
        Ok(Self {
            env,
            orchestrator,
            config,
        })
    }

    /// Runs one episode.
    pub fn run_episode<A: Agent<E>>(&mut self, agent: &mut A, explore: bool) -> Result<Record> {
        let mut obs = self.env.reset()?;
        let mut steps = 0;
        let mut last_reward = 0.0;
        let mut replayed = 0.0;
        let mut is_terminated = false;
        if explore {
            self.orchestrator.begin_episode();
        }

        while !is_terminated {
            let act = agent.sample(&obs);
            let step = self.env.step(&act)?;
            steps += 1;
            last_reward = step.reward;
            is_terminated = step.is_terminated;

            if explore {
                let record = self.orchestrator.observe(
                    agent,
                    obs,
                    step.act,
                    step.reward,
                    step.obs.clone(),
                    is_terminated,
                )?;
                replayed += record.get_scalar("replayed")?;
            }
            obs = step.obs;

            if !is_terminated && Some(steps) == self.config.max_steps_per_episode {
                if explore {
                    let record = self.orchestrator.end_episode(agent)?;
                    replayed += record.get_scalar("replayed")?;
                }
                break;
            }
        }

        Ok(Record::from_slice(&[
            ("steps", RecordValue::Scalar(steps as _)),
            ("last_reward", RecordValue::Scalar(last_reward)),
            ("replayed", RecordValue::Scalar(replayed)),
            (
                "buffer_size",
                RecordValue::Scalar(self.orchestrator.buffer_size() as _),
            ),
            (
                "mode",
                RecordValue::String(if explore { "explore" } else { "exploit" }.to_string()),
            ),
        ]))
    }

    /// Runs `max_episodes` episodes and writes their records to `recorder`.
    pub fn train<A, R>(&mut self, agent: &mut A, recorder: &mut R) -> Result<()>
    where
        A: Agent<E>,
        R: Recorder + ?Sized,
    {
        for episode in 0..self.config.max_episodes {
            let exploit = self.config.exploit_interval > 0
                && (episode + 1) % self.config.exploit_interval == 0;
            if exploit {
                agent.eval();
            } else {
                agent.train();
            }

            let mut record = self.run_episode(agent, !exploit)?;
            info!(
                "Episode {:?}, {:?} steps, reward = {:?}",
                episode,
                record.get_scalar("steps")?,
                record.get_scalar("last_reward")?
            );

            if episode % self.config.record_interval.max(1) == 0 {
                record.insert("episode", RecordValue::Scalar(episode as _));
                recorder.write(record);
            }
        }
        agent.train();

        Ok(())
    }

    /// The orchestrator fed by explore episodes.
    pub fn orchestrator(&self) -> &ReplayOrchestrator<E::Obs, E::Act, W> {
        &self.orchestrator
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }
}
