use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algo::{Learner, QTable},
    config::{Config, ExplorationConfig},
    decay::Step,
    env::World,
    error::{Error, Result},
    exploration::EpsilonGreedy,
    runner::{EpisodeRunner, TickOutcome},
    store::Store,
    trainer::{EpisodeReport, Trainer, TrainingSummary},
};

/// The pursuers' shared brain
///
/// Owns the table, the live exploration rate and the persistence backend, and exposes the
/// operations the surrounding game needs: stepping a tick, pretraining, tuning or decaying
/// exploration, and resetting what was learned. Every live tick writes the table through to the
/// store.
pub struct Agent<S: Store> {
    config: Config,
    table: QTable,
    runner: EpisodeRunner,
    trainer: Trainer,
    exploration: EpsilonGreedy<Step>,
    levels_cleared: u32,
    store: S,
    rng: StdRng,
}

/// Live rate starting at `rate`, one decay step per cleared level
fn live_exploration(config: &ExplorationConfig, rate: f32) -> Result<EpsilonGreedy<Step>> {
    Ok(EpsilonGreedy::new(Step::new(
        config.level_decay,
        rate,
        config.level_floor,
        1.0,
    )?))
}

impl<S: Store> Agent<S> {
    /// Build an agent and load its table from `store`
    ///
    /// A missing or unreadable record starts from an empty table. Fails if `config` does not pass
    /// [`Config::validate`] or describes an invalid decay schedule.
    ///
    /// **Panics** if the learning rate or discount factor is out of range
    pub fn new(config: Config, store: S) -> Result<Self> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Like [`Agent::new`] with a reproducible random stream
    pub fn with_seed(config: Config, store: S, seed: u64) -> Result<Self> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, store: S, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let learner = Learner::new(config.learner.clone());
        let mut agent = Self {
            table: QTable::new(),
            runner: EpisodeRunner::new(learner.clone(), config.rewards),
            trainer: Trainer::new(config.trainer.clone(), learner)?,
            exploration: live_exploration(&config.exploration, config.exploration.default)?,
            levels_cleared: 0,
            config,
            store,
            rng,
        };
        let loaded = agent.load();
        agent.initialize(loaded);
        Ok(agent)
    }

    /// Replace the table with `table`, or start empty
    pub fn initialize(&mut self, table: Option<QTable>) {
        self.table = table.unwrap_or_default();
    }

    fn load(&self) -> Option<QTable> {
        let key = &self.config.store.key;
        match self.store.load(key) {
            Ok(Some(record)) => match QTable::from_json(&record) {
                Ok(table) => {
                    info!("Loaded Q-table `{key}` with {} states", table.len());
                    Some(table)
                }
                Err(e) => {
                    warn!("Discarding unreadable Q-table `{key}`: {e}");
                    None
                }
            },
            Ok(None) => {
                info!("No stored Q-table `{key}`, starting cold");
                None
            }
            Err(e) => {
                warn!("Could not read Q-table `{key}`: {e}");
                None
            }
        }
    }

    /// Write the table to the store
    pub fn save(&mut self) -> Result<()> {
        let record = self.table.to_json()?;
        self.store.save(&self.config.store.key, &record)?;
        debug!("Saved Q-table with {} states", self.table.len());
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to persist Q-table: {e}");
        }
    }

    /// Move and train every pursuer in `world` for one tick, then persist the table
    pub fn step(&mut self, world: &mut World) -> TickOutcome {
        let epsilon = self.exploration_rate();
        let outcome = self
            .runner
            .step(world, &mut self.table, epsilon, &mut self.rng);
        self.persist();
        outcome
    }

    /// Current live exploration rate
    pub fn exploration_rate(&self) -> f32 {
        self.exploration.epsilon(self.levels_cleared)
    }

    /// Set the live exploration rate; later level decay starts from this value
    ///
    /// A `rate` outside `[0,1]` is rejected and the current rate kept.
    pub fn set_exploration_rate(&mut self, rate: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::InvalidParameter(format!(
                "exploration rate must be in [0, 1], got {rate}"
            )));
        }
        self.exploration = live_exploration(&self.config.exploration, rate)?;
        self.levels_cleared = 0;
        Ok(())
    }

    /// Level completed: decay the live exploration rate one notch
    pub fn decay_exploration(&mut self) {
        self.levels_cleared += 1;
        info!("Exploration rate decayed to {:.3}", self.exploration_rate());
    }

    /// Forget everything learned and delete the stored record
    pub fn reset(&mut self) -> Result<()> {
        self.table.clear();
        self.store.delete(&self.config.store.key)?;
        info!("Q-table reset");
        Ok(())
    }

    /// Pretrain on `episodes` simulated episodes, then restore the default live exploration rate
    /// and persist the table
    pub fn pretrain(&mut self, episodes: u32) -> TrainingSummary {
        self.pretrain_with(episodes, |_| {})
    }

    /// Like [`Agent::pretrain`], calling `on_episode` after every episode
    pub fn pretrain_with(
        &mut self,
        episodes: u32,
        on_episode: impl FnMut(&EpisodeReport),
    ) -> TrainingSummary {
        let summary = self.trainer.run_with(
            &mut self.table,
            episodes,
            self.config.grid.cols,
            self.config.grid.rows,
            &mut self.rng,
            on_episode,
        );
        self.restore_default_exploration();
        self.persist();
        summary
    }

    fn restore_default_exploration(&mut self) {
        let default = self.config.exploration.default;
        match live_exploration(&self.config.exploration, default) {
            Ok(exploration) => {
                self.exploration = exploration;
                self.levels_cleared = 0;
            }
            // validated when the agent was built
            Err(e) => warn!("Keeping current exploration schedule: {e}"),
        }
    }

    /// Restart-of-game: default exploration rate, table kept
    pub fn restart(&mut self) {
        self.restore_default_exploration();
    }

    pub fn serialize(&self) -> Result<String> {
        self.table.to_json()
    }

    /// Replace the table with a serialized one; on error the current table is kept
    pub fn deserialize(&mut self, input: &str) -> Result<()> {
        self.table = QTable::from_json(input)?;
        Ok(())
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::{Action, Grid, Pos},
        state::{DistanceBucket, StateKey},
        store::{MemoryStore, QTABLE_KEY},
    };

    fn agent(store: MemoryStore) -> Agent<MemoryStore> {
        Agent::with_seed(Config::default(), store, 7).unwrap()
    }

    fn world() -> World {
        World::new(
            Grid::new(10, 6),
            vec![Pos::new(8, 4), Pos::new(7, 3)],
            Pos::new(1, 1),
            vec![Pos::new(5, 5)],
        )
    }

    #[test]
    fn cold_start_on_missing_or_corrupt_record() {
        let agent = agent(MemoryStore::new());
        assert!(agent.table().is_empty(), "Missing record is an empty table");

        let mut store = MemoryStore::new();
        store.save(QTABLE_KEY, "{ not json").unwrap();
        let agent = self::agent(store);
        assert!(agent.table().is_empty(), "Corrupt record is an empty table");
    }

    #[test]
    fn loads_stored_table() {
        let mut store = MemoryStore::new();
        store
            .save(QTABLE_KEY, r#"{"-1,-1,F":[0,0,0,2.5,0]}"#)
            .unwrap();
        let agent = agent(store);
        let s = StateKey::new(-1, -1, DistanceBucket::Far);
        assert_eq!(agent.table().best_action(s), Action::Left);
    }

    #[test]
    fn step_writes_through() {
        let mut agent = agent(MemoryStore::new());
        let mut world = world();
        agent.step(&mut world);

        let record = agent.store().load(QTABLE_KEY).unwrap().expect("persisted");
        let stored = QTable::from_json(&record).unwrap();
        assert_eq!(&stored, agent.table(), "Stored table matches memory");
        assert!(!stored.is_empty());
    }

    #[test]
    fn pretrain_restores_default_epsilon() {
        for episodes in [0, 1, 25] {
            let mut agent = agent(MemoryStore::new());
            agent.set_exploration_rate(0.7).unwrap();
            agent.decay_exploration();
            let summary = agent.pretrain(episodes);

            assert_eq!(summary.episodes, episodes);
            assert_eq!(agent.exploration_rate(), 0.2, "Default rate after {episodes} episodes");
            if episodes > 0 {
                assert!(!agent.table().is_empty(), "Table populated");
            }
            assert!(agent.store().load(QTABLE_KEY).unwrap().is_some(), "Persisted");
        }
    }

    #[test]
    fn level_decay_is_floored() {
        let mut agent = agent(MemoryStore::new());
        assert_eq!(agent.exploration_rate(), 0.2);

        agent.decay_exploration();
        assert!((agent.exploration_rate() - 0.18).abs() < 1e-6);

        for _ in 0..100 {
            agent.decay_exploration();
        }
        assert_eq!(agent.exploration_rate(), 0.02, "Floor reached");

        agent.set_exploration_rate(0.5).unwrap();
        assert_eq!(agent.exploration_rate(), 0.5, "Set restarts the schedule");

        agent.set_exploration_rate(0.01).unwrap();
        assert_eq!(agent.exploration_rate(), 0.01, "Rate below floor is accepted");
        agent.decay_exploration();
        assert_eq!(agent.exploration_rate(), 0.02, "Decay lifts it to the floor");

        agent.set_exploration_rate(0.015).unwrap();
        agent.decay_exploration();
        assert_eq!(agent.exploration_rate(), 0.02, "max(0.02, 0.015 * 0.9)");
        agent.decay_exploration();
        assert_eq!(agent.exploration_rate(), 0.02);

        agent.restart();
        assert_eq!(agent.exploration_rate(), 0.2);
    }

    #[test]
    fn rejects_bad_exploration_rate() {
        let mut agent = agent(MemoryStore::new());
        agent.decay_exploration();
        let before = agent.exploration_rate();
        for rate in [1.5, -0.1, f32::NAN] {
            assert!(agent.set_exploration_rate(rate).is_err(), "{rate} rejected");
            assert_eq!(agent.exploration_rate(), before, "Rate kept after {rate}");
        }
    }

    #[test]
    fn rejects_bad_config() {
        let mut config = Config::default();
        config.grid.cols = 0;
        assert!(Agent::with_seed(config, MemoryStore::new(), 1).is_err(), "Empty board");

        let mut config = Config::default();
        config.exploration.default = 1.2;
        assert!(Agent::with_seed(config, MemoryStore::new(), 1).is_err(), "Default rate");
    }

    #[test]
    fn reset_clears_and_deletes() {
        let mut agent = agent(MemoryStore::new());
        agent.step(&mut world());
        assert!(!agent.table().is_empty());

        agent.reset().unwrap();
        assert!(agent.table().is_empty(), "Memory cleared");
        assert!(agent.store().load(QTABLE_KEY).unwrap().is_none(), "Record deleted");
    }

    #[test]
    fn serialize_round_trip() {
        let mut agent = agent(MemoryStore::new());
        agent.pretrain(20);
        let json = agent.serialize().unwrap();

        let mut other = self::agent(MemoryStore::new());
        other.deserialize(&json).unwrap();
        assert_eq!(other.table(), agent.table());

        assert!(other.deserialize("[]").is_err());
        assert_eq!(other.table(), agent.table(), "Bad input keeps the table");
    }

    #[test]
    fn initialize_replaces_table() {
        let mut agent = agent(MemoryStore::new());
        let mut table = QTable::new();
        table.ensure(StateKey::new(0, 0, DistanceBucket::Near))[4] = 1.0;
        agent.initialize(Some(table.clone()));
        assert_eq!(agent.table(), &table);
        agent.initialize(None);
        assert!(agent.table().is_empty());
    }
}
