//! Environments and agents used in tests.
use crate::{Agent, Env, Learner, Policy, Step, Transition};
use anyhow::Result;

/// Configuration of [`CorridorEnv`].
#[derive(Clone, Debug)]
pub struct CorridorEnvConfig {
    /// Number of cells; the last cell is the goal.
    pub length: usize,
}

/// A one-dimensional corridor.
///
/// The observation is the position. Action `1` moves right, any other action
/// moves left (bounded at the start). Reaching the last cell terminates the
/// episode with reward `1`; every other step has reward `0`.
pub struct CorridorEnv {
    length: usize,
    pos: usize,
}

impl Env for CorridorEnv {
    type Config = CorridorEnvConfig;
    type Obs = usize;
    type Act = i8;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        anyhow::ensure!(config.length > 1, "Corridor needs at least two cells");
        Ok(Self {
            length: config.length,
            pos: 0,
        })
    }

    fn reset(&mut self) -> Result<usize> {
        self.pos = 0;
        Ok(self.pos)
    }

    fn step(&mut self, a: &i8) -> Result<Step<Self>> {
        self.pos = match *a {
            1 => self.pos + 1,
            _ => self.pos.saturating_sub(1),
        };
        let is_terminated = self.pos + 1 == self.length;
        let reward = if is_terminated { 1.0 } else { 0.0 };
        Ok(Step::new(self.pos, *a, reward, is_terminated, ()))
    }
}

/// An agent that always takes the same action and logs every replayed
/// transition.
pub struct RecordingAgent {
    act: i8,
    train: bool,
    replayed: Vec<Transition<usize, i8>>,
}

impl RecordingAgent {
    /// Constructs an agent taking `act` at every step.
    pub fn new(act: i8) -> Self {
        Self {
            act,
            train: true,
            replayed: vec![],
        }
    }

    /// Replayed transitions in replay order.
    pub fn replayed(&self) -> &[Transition<usize, i8>] {
        &self.replayed
    }
}

impl Policy<CorridorEnv> for RecordingAgent {
    fn sample(&mut self, _obs: &usize) -> i8 {
        self.act
    }
}

impl Learner<usize, i8> for RecordingAgent {
    fn replay_update(&mut self, tr: &Transition<usize, i8>) -> Result<()> {
        self.replayed.push(tr.clone());
        Ok(())
    }
}

impl Agent<CorridorEnv> for RecordingAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }
}
