//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of episodes to run.
    pub max_episodes: usize,

    /// Every `exploit_interval`-th episode is an exploit episode, run without
    /// admission and replay. `0` disables exploit episodes.
    pub exploit_interval: usize,

    /// Interval of writing episode records in episodes.
    pub record_interval: usize,

    /// Episodes reaching this number of steps are ended without a terminal step.
    pub max_steps_per_episode: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 0,
            exploit_interval: 0,
            record_interval: 1,
            max_steps_per_episode: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the interval of exploit episodes.
    pub fn exploit_interval(mut self, v: usize) -> Self {
        self.exploit_interval = v;
        self
    }

    /// Sets the interval of writing records.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the step limit of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = Some(v);
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
