use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    algo::{Learner, QTable},
    decay::Step,
    env::World,
    error::Result,
    exploration::EpsilonGreedy,
    grid::Grid,
    reward::RewardParams,
    runner::EpisodeRunner,
};

/// Configuration for the [`Trainer`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of simulated episodes
    ///
    /// **Default**: `1000`
    pub episodes: u32,
    /// Tick limit per episode
    ///
    /// **Default**: `60`
    pub max_steps: u32,
    /// Pursuers per episode, all sharing the table
    ///
    /// **Default**: `2`
    pub pursuers: usize,
    /// Collectibles placed at the start of each episode
    ///
    /// **Default**: `3`
    pub collectibles: usize,
    /// Exploration rate of the first episode
    ///
    /// **Default**: `0.8`
    pub epsilon_start: f32,
    /// Multiplier applied to the exploration rate after every episode
    ///
    /// **Default**: `0.999`
    pub epsilon_decay: f32,
    /// Lowest exploration rate reachable during pretraining
    ///
    /// **Default**: `0.1`
    pub epsilon_floor: f32,
    /// **Default**: [`RewardParams::PRETRAIN`]
    pub rewards: RewardParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps: 60,
            pursuers: 2,
            collectibles: 3,
            epsilon_start: 0.8,
            epsilon_decay: 0.999,
            epsilon_floor: 0.1,
            rewards: RewardParams::PRETRAIN,
        }
    }
}

/// Per-episode training metrics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeReport {
    pub episode: u32,
    pub steps: u32,
    /// Reward summed over all pursuers and ticks
    pub reward: f32,
    pub captured: bool,
    /// Every collectible was consumed before the episode ended
    pub cleared: bool,
    /// Exploration rate used throughout the episode
    pub epsilon: f32,
}

/// Aggregate of a pretraining run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingSummary {
    pub episodes: u32,
    pub captures: u32,
    pub cleared: u32,
    pub total_steps: u64,
}

impl TrainingSummary {
    pub fn mean_steps(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.episodes as f64
        }
    }

    fn record(&mut self, report: &EpisodeReport) {
        self.episodes += 1;
        self.captures += report.captured as u32;
        self.cleared += report.cleared as u32;
        self.total_steps += report.steps as u64;
    }
}

/// Offline pretraining on randomized boards
///
/// Each episode drops the target, the pursuers and a few collectibles on an obstacle-free board
/// and runs the same tick as live play until a capture, until every collectible is gone, or
/// until the tick limit. The exploration rate decays once per episode.
pub struct Trainer {
    config: TrainerConfig,
    runner: EpisodeRunner,
    exploration: EpsilonGreedy<Step>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, learner: Learner) -> Result<Self> {
        let exploration = EpsilonGreedy::new(Step::new(
            config.epsilon_decay,
            config.epsilon_start,
            config.epsilon_floor,
            1.0,
        )?);
        Ok(Self {
            runner: EpisodeRunner::new(learner, config.rewards),
            exploration,
            config,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run `episodes` episodes on a `cols` x `rows` board
    pub fn run(
        &self,
        table: &mut QTable,
        episodes: u32,
        cols: i32,
        rows: i32,
        rng: &mut impl Rng,
    ) -> TrainingSummary {
        self.run_with(table, episodes, cols, rows, rng, |_| {})
    }

    /// Like [`Trainer::run`], calling `on_episode` after every episode
    pub fn run_with(
        &self,
        table: &mut QTable,
        episodes: u32,
        cols: i32,
        rows: i32,
        rng: &mut impl Rng,
        mut on_episode: impl FnMut(&EpisodeReport),
    ) -> TrainingSummary {
        info!("Pretraining pursuers for {episodes} episodes on a {cols}x{rows} board");

        let mut summary = TrainingSummary::default();
        for episode in 0..episodes {
            let report = self.episode(table, episode, Grid::new(cols, rows), rng);
            debug!(
                "episode {episode}: steps={} reward={:.2} captured={} epsilon={:.3}",
                report.steps, report.reward, report.captured, report.epsilon
            );
            summary.record(&report);
            on_episode(&report);
        }

        info!(
            "Pretraining done: {} captures, {} boards cleared, {:.1} mean steps, {} states known",
            summary.captures,
            summary.cleared,
            summary.mean_steps(),
            table.len()
        );
        summary
    }

    fn episode(
        &self,
        table: &mut QTable,
        episode: u32,
        grid: Grid,
        rng: &mut impl Rng,
    ) -> EpisodeReport {
        let epsilon = self.exploration.epsilon(episode);
        let mut world = World::random(
            grid,
            self.config.pursuers,
            self.config.collectibles,
            rng,
        );

        let mut report = EpisodeReport {
            episode,
            epsilon,
            ..Default::default()
        };
        for _ in 0..self.config.max_steps {
            let outcome = self.runner.step(&mut world, table, epsilon, rng);
            report.steps += 1;
            report.reward += outcome.total_reward();
            if outcome.captured {
                report.captured = true;
                break;
            }
            if world.collectibles.is_empty() {
                report.cleared = true;
                break;
            }
        }
        report
    }
}
