use anyhow::Result;
use lcs_replay_core::{
    dummy::{CorridorEnv, CorridorEnvConfig, RecordingAgent},
    record::{BufferedRecorder, NullRecorder},
    replay_buffer::StagingOrder,
    Agent, Correctable, DeferredCorrector, Learner, Policy, ReplayConfig, Trainer,
    TrainerConfig, Transition,
};
use test_log::test;

fn replay_config() -> ReplayConfig {
    ReplayConfig::default()
        .buffer_capacity(10)
        .min_samples_before_replay(3)
        .samples_per_update(2)
}

fn env_config() -> CorridorEnvConfig {
    CorridorEnvConfig { length: 4 }
}

#[test]
fn test_explore_and_exploit_episodes() -> Result<()> {
    let config = TrainerConfig::default()
        .max_episodes(4)
        .exploit_interval(2);
    let mut trainer = Trainer::<CorridorEnv>::build(config, &env_config(), &replay_config())?;
    let mut agent = RecordingAgent::new(1);
    let mut recorder = BufferedRecorder::new();

    trainer.train(&mut agent, &mut recorder)?;

    // Episodes 0 and 2 explore with 3 steps each; replay starts at the 3rd transition
    assert_eq!(trainer.orchestrator().buffer_size(), 6);
    assert_eq!(agent.replayed().len(), 2 + 3 * 2);
    assert!(agent.is_train());

    let modes = recorder
        .iter()
        .map(|r| r.get_string("mode"))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(modes, vec!["explore", "exploit", "explore", "exploit"]);
    for record in recorder.iter() {
        assert_eq!(record.get_scalar("steps")?, 3.0);
        assert_eq!(record.get_scalar("last_reward")?, 1.0);
    }
    assert_eq!(recorder.iter().nth(2).unwrap().get_scalar("replayed")?, 6.0);
    Ok(())
}

#[test]
fn test_staged_episodes_replay_at_episode_end() -> Result<()> {
    let replay_config = replay_config()
        .episodic_staging(true)
        .staging_order(StagingOrder::ReverseChronological);
    let config = TrainerConfig::default().max_episodes(2);
    let mut trainer = Trainer::<CorridorEnv>::build(config, &env_config(), &replay_config)?;
    let mut agent = RecordingAgent::new(1);
    let mut recorder = BufferedRecorder::new();

    trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(trainer.orchestrator().buffer_size(), 6);
    assert_eq!(agent.replayed().len(), 2 * 2);

    // Within an episode, transitions are admitted newest first
    let times = trainer
        .orchestrator()
        .buffer()
        .iter()
        .map(|tr| tr.time)
        .collect::<Vec<_>>();
    assert_eq!(times, vec![2, 1, 0, 5, 4, 3]);
    Ok(())
}

#[test]
fn test_truncated_episode_is_merged() -> Result<()> {
    let replay_config = replay_config().episodic_staging(true);
    let config = TrainerConfig::default()
        .max_episodes(1)
        .max_steps_per_episode(5);
    let mut trainer = Trainer::<CorridorEnv>::build(config, &env_config(), &replay_config)?;

    // Moving left never reaches the goal
    let mut agent = RecordingAgent::new(-1);
    let mut recorder = NullRecorder::default();
    trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(trainer.orchestrator().buffer_size(), 5);
    assert_eq!(trainer.orchestrator().staged_len(), 0);
    assert_eq!(agent.replayed().len(), 2);
    assert!(agent.replayed().iter().all(|tr| !tr.is_terminated));
    Ok(())
}

#[test]
fn test_malformed_replay_config_is_rejected_at_build() {
    let replay_config = replay_config().min_samples_before_replay(1);
    assert!(
        Trainer::<CorridorEnv>::build(TrainerConfig::default(), &env_config(), &replay_config)
            .is_err()
    );
}

#[test]
fn test_seed_beyond_environment_range_is_rejected() {
    let config = TrainerConfig::default();
    let seed = i64::MAX as u64;
    assert!(Trainer::<CorridorEnv>::build(config.clone(), &env_config(), &replay_config().seed(seed)).is_ok());
    assert!(
        Trainer::<CorridorEnv>::build(config, &env_config(), &replay_config().seed(seed + 1))
            .is_err()
    );
}

/// A rule predicting the displacement caused by its action.
struct Rule {
    act: i8,
    effect: f32,
    error: f32,
}

impl Correctable for Rule {
    type Effect = f32;

    fn effect(&self) -> &f32 {
        &self.effect
    }

    fn error(&self) -> f32 {
        self.error
    }

    fn set_error(&mut self, error: f32) {
        self.error = error;
    }
}

/// A population-based learner queueing corrections of wrong predictions.
struct RuleAgent {
    population: Vec<Rule>,
    corrector: DeferredCorrector<usize, f32>,
    n_replayed: usize,
}

impl Policy<CorridorEnv> for RuleAgent {
    fn sample(&mut self, _obs: &usize) -> i8 {
        1
    }
}

impl Learner<usize, i8> for RuleAgent {
    fn replay_update(&mut self, tr: &Transition<usize, i8>) -> Result<()> {
        self.n_replayed += 1;
        let observed = tr.next_obs as f32 - tr.obs as f32;
        let matching = self
            .population
            .iter()
            .enumerate()
            .filter(|(_, r)| r.act == tr.act)
            .map(|(ix, r)| (ix, r.effect))
            .collect::<Vec<_>>();
        for (ix, predicted) in matching {
            self.corrector
                .enqueue(&mut self.population, ix, &predicted, observed);
        }
        Ok(())
    }
}

impl Agent<CorridorEnv> for RuleAgent {
    fn train(&mut self) {}

    fn eval(&mut self) {}

    fn is_train(&self) -> bool {
        true
    }
}

#[test]
fn test_population_learner_flushes_corrections_in_batches() -> Result<()> {
    let replay_config = replay_config().correction_threshold(4).error_learning_rate(0.5);
    let mut agent = RuleAgent {
        population: vec![
            // Wrong prediction, corrected on every replay
            Rule { act: 1, effect: 0.0, error: 0.0 },
            // Right prediction, never corrected
            Rule { act: 1, effect: 1.0, error: 0.0 },
            // Never matches
            Rule { act: -1, effect: -1.0, error: 0.0 },
        ],
        corrector: DeferredCorrector::build(&replay_config)?,
        n_replayed: 0,
    };
    let config = TrainerConfig::default().max_episodes(2);
    let mut trainer = Trainer::<CorridorEnv>::build(config, &env_config(), &replay_config)?;
    trainer.train(&mut agent, &mut NullRecorder::default())?;

    // 8 replays, each queueing one correction of rule 0: two flushes of 4
    assert_eq!(agent.n_replayed, 8);
    assert!(agent.corrector.is_empty());
    let expected = 1.0 - 0.5f32.powi(8);
    assert!((agent.population[0].error - expected).abs() < 1e-6);
    assert_eq!(agent.population[1].error, 0.0);
    assert_eq!(agent.population[2].error, 0.0);
    Ok(())
}
