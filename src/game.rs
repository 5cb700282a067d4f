use std::{
    thread,
    time::{Duration, Instant},
};

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    agent::Agent,
    env::World,
    grid::{Action, Grid, Pos},
    runner::TickOutcome,
    store::Store,
};

/// Period of the live tick
pub const TICK_PERIOD: Duration = Duration::from_millis(500);

/// Last level; clearing it wins the game
pub const MAX_LEVEL: u32 = 5;

/// Lives at the start of a game
pub const START_LIVES: u32 = 3;

/// Level layouts
pub struct Level;

impl Level {
    /// Starting cells: the target near the top-left corner, two pursuers near the bottom-right
    pub fn start_positions(cols: i32, rows: i32) -> (Pos, Vec<Pos>) {
        (
            Pos::new(1, 1),
            vec![Pos::new(cols - 2, rows - 2), Pos::new(cols - 3, rows - 3)],
        )
    }

    /// Lay out level `n` on a `cols` x `rows` board
    ///
    /// Level `n` holds `2 + min(4, n)` collectibles and `min(8, 2n)` obstacles, each dropped on a
    /// random cell not taken by anything placed before it. Placement stops early on a full board.
    ///
    /// **Panics** if the board is smaller than 5 x 5
    pub fn seed(n: u32, cols: i32, rows: i32, rng: &mut impl Rng) -> World {
        assert!(cols >= 5 && rows >= 5, "Board must be at least 5x5.");
        let (target, pursuers) = Self::start_positions(cols, rows);
        let mut grid = Grid::new(cols, rows);

        let mut occupied = pursuers.clone();
        occupied.push(target);

        let mut collectibles = Vec::new();
        for _ in 0..2 + n.min(4) {
            let Some(p) = grid.random_vacant(&occupied, rng) else {
                break;
            };
            occupied.push(p);
            collectibles.push(p);
        }

        for _ in 0..(2 * n).min(8) {
            let Some(p) = grid.random_vacant(&occupied, rng) else {
                break;
            };
            grid.add_obstacle(p);
        }

        World::new(grid, pursuers, target, collectibles)
    }
}

/// Why a game was lost
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loss {
    /// A pursuer caught the target on the last life
    Caught,
    /// The pursuers took every collectible on the last life
    Frozen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Victory,
    GameOver(Loss),
}

/// Lives, score and level progression around a [`World`]
pub struct Session {
    level: u32,
    lives: u32,
    score: u32,
    status: Status,
    world: World,
    rng: StdRng,
}

impl Session {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self::with_rng(cols, rows, StdRng::from_entropy())
    }

    pub fn with_seed(cols: i32, rows: i32, seed: u64) -> Self {
        Self::with_rng(cols, rows, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cols: i32, rows: i32, mut rng: StdRng) -> Self {
        let world = Level::seed(1, cols, rows, &mut rng);
        Self {
            level: 1,
            lives: START_LIVES,
            score: 0,
            status: Status::Playing,
            world,
            rng,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn reseed(&mut self) {
        let (cols, rows) = (self.world.grid.cols(), self.world.grid.rows());
        self.world = Level::seed(self.level, cols, rows, &mut self.rng);
    }

    fn next_level<S: Store>(&mut self, agent: &mut Agent<S>) {
        self.level += 1;
        agent.decay_exploration();
        self.reseed();
        info!("Level {} begins", self.level);
    }

    /// Move the target one cell; collectibles it lands on count toward the score
    ///
    /// Returns whether the target moved. Ignored unless the game is in progress.
    pub fn move_target<S: Store>(&mut self, action: Action, agent: &mut Agent<S>) -> bool {
        if self.status != Status::Playing {
            return false;
        }
        let from = self.world.target;
        let to = self.world.grid.resolve(from, action);
        if to == from {
            return false;
        }
        self.world.target = to;

        let before = self.world.collectibles.len();
        self.world.collectibles.retain(|&c| c != to);
        let taken = (before - self.world.collectibles.len()) as u32;
        if taken > 0 {
            self.score += taken;
            if self.world.collectibles.is_empty() {
                info!("Level {} complete", self.level);
                if self.level >= MAX_LEVEL {
                    self.status = Status::Victory;
                } else {
                    self.next_level(agent);
                }
            }
        }
        true
    }

    /// Run one live tick of the pursuers and settle lives and levels
    pub fn tick<S: Store>(&mut self, agent: &mut Agent<S>) -> TickOutcome {
        if self.status != Status::Playing {
            return TickOutcome::default();
        }
        let outcome = agent.step(&mut self.world);

        if outcome.captured {
            self.lives = self.lives.saturating_sub(1);
            info!("Target caught, {} lives left", self.lives);
            if self.lives == 0 {
                self.status = Status::GameOver(Loss::Caught);
            } else {
                let (cols, rows) = (self.world.grid.cols(), self.world.grid.rows());
                let (target, pursuers) = Level::start_positions(cols, rows);
                self.world.target = target;
                self.world.pursuers = pursuers;
            }
        } else if self.world.collectibles.is_empty() {
            self.lives = self.lives.saturating_sub(1);
            info!("Pursuers took every collectible, {} lives left", self.lives);
            if self.lives == 0 {
                self.status = Status::GameOver(Loss::Frozen);
            } else {
                self.next_level(agent);
            }
        }
        outcome
    }

    /// Back to level one with full lives and the default exploration rate
    pub fn restart<S: Store>(&mut self, agent: &mut Agent<S>) {
        self.level = 1;
        self.lives = START_LIVES;
        self.score = 0;
        self.status = Status::Playing;
        agent.restart();
        self.reseed();
    }
}

/// Fixed-period tick source
///
/// Ticks are driven from one thread: [`Ticker::wait`] returns once per period and the caller runs
/// the whole tick before waiting again, so two ticks never overlap.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// (Re)start the schedule; a running schedule is stopped first
    pub fn start(&mut self) {
        self.stop();
        self.next = Some(Instant::now() + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Block until the next tick is due
    ///
    /// Returns `false` immediately if the ticker is stopped.
    pub fn wait(&mut self) -> bool {
        let Some(deadline) = self.next else {
            return false;
        };
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        self.next = Some(deadline + self.period);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, store::MemoryStore};

    fn agent() -> Agent<MemoryStore> {
        Agent::with_seed(Config::default(), MemoryStore::new(), 3).unwrap()
    }

    fn greedy_agent() -> Agent<MemoryStore> {
        let mut agent = agent();
        agent.set_exploration_rate(0.0).unwrap();
        agent
    }

    #[test]
    fn level_layout() {
        let mut rng = StdRng::seed_from_u64(5);
        for n in 1..=6 {
            let world = Level::seed(n, 10, 6, &mut rng);
            assert_eq!(world.target, Pos::new(1, 1));
            assert_eq!(world.pursuers, vec![Pos::new(8, 4), Pos::new(7, 3)]);
            assert_eq!(world.collectibles.len(), 2 + n.min(4) as usize, "Level {n} items");
            assert_eq!(world.grid.obstacles().len(), (2 * n).min(8) as usize, "Level {n} walls");

            let mut taken = world.collectibles.clone();
            taken.extend(world.grid.obstacles().iter().copied());
            taken.push(world.target);
            taken.extend(world.pursuers.iter().copied());
            let mut unique = taken.clone();
            unique.sort_by_key(|p| (p.x, p.y));
            unique.dedup();
            assert_eq!(unique.len(), taken.len(), "No two things share a cell");
        }
    }

    #[test]
    fn player_clears_level() {
        let mut agent = agent();
        let mut session = Session::with_seed(10, 6, 1);
        session.world_mut().collectibles = vec![Pos::new(2, 1)];
        session.world_mut().grid = Grid::new(10, 6);

        assert!(session.move_target(Action::Right, &mut agent));
        assert_eq!(session.score(), 1);
        assert_eq!(session.level(), 2, "Next level");
        assert_eq!(session.world().collectibles.len(), 4, "Level 2 reseeded");
        assert!((agent.exploration_rate() - 0.18).abs() < 1e-6, "Exploration decayed");
    }

    #[test]
    fn blocked_target_does_not_move() {
        let mut agent = agent();
        let mut session = Session::with_seed(10, 6, 1);
        session.world_mut().grid = Grid::new(10, 6).with_obstacles([Pos::new(1, 0)]);
        assert!(!session.move_target(Action::Up, &mut agent));
        assert_eq!(session.world().target, Pos::new(1, 1));
    }

    #[test]
    fn victory_on_last_level() {
        let mut agent = agent();
        let mut session = Session::with_seed(10, 6, 2);
        session.level = MAX_LEVEL;
        session.world_mut().collectibles = vec![Pos::new(1, 2)];
        session.world_mut().grid = Grid::new(10, 6);

        session.move_target(Action::Down, &mut agent);
        assert_eq!(session.status(), Status::Victory);
        assert!(!session.move_target(Action::Down, &mut agent), "Game over ignores input");
    }

    #[test]
    fn capture_costs_a_life() {
        let mut agent = greedy_agent();
        let mut session = Session::with_seed(10, 6, 3);
        // pursuer directly below the target, cold table picks Up
        session.world_mut().pursuers = vec![Pos::new(1, 2), Pos::new(8, 4)];
        session.world_mut().grid = Grid::new(10, 6);

        let outcome = session.tick(&mut agent);
        assert!(outcome.captured);
        assert_eq!(session.lives(), START_LIVES - 1);
        assert_eq!(session.status(), Status::Playing);
        assert_eq!(session.world().pursuers, vec![Pos::new(8, 4), Pos::new(7, 3)], "Reset");

        session.lives = 1;
        session.world_mut().pursuers = vec![Pos::new(1, 2), Pos::new(8, 4)];
        session.tick(&mut agent);
        assert_eq!(session.status(), Status::GameOver(Loss::Caught));
    }

    #[test]
    fn pursuers_taking_everything_costs_a_life() {
        let mut agent = greedy_agent();
        let mut session = Session::with_seed(10, 6, 4);
        session.world_mut().grid = Grid::new(10, 6);
        session.world_mut().pursuers = vec![Pos::new(6, 4), Pos::new(8, 4)];
        session.world_mut().collectibles = vec![Pos::new(6, 3)];

        let outcome = session.tick(&mut agent);
        assert!(outcome.collected && !outcome.captured);
        assert_eq!(session.lives(), START_LIVES - 1);
        assert_eq!(session.level(), 2, "Moves on to the next level");

        session.restart(&mut agent);
        assert_eq!(
            (session.level(), session.lives(), session.score()),
            (1, START_LIVES, 0)
        );
        assert_eq!(agent.exploration_rate(), 0.2);
    }

    #[test]
    fn pursuers_taking_everything_on_last_life_ends_game() {
        let mut agent = greedy_agent();
        let mut session = Session::with_seed(10, 6, 5);
        session.lives = 1;
        session.world_mut().grid = Grid::new(10, 6);
        session.world_mut().pursuers = vec![Pos::new(6, 4), Pos::new(8, 4)];
        session.world_mut().collectibles = vec![Pos::new(6, 3)];

        let outcome = session.tick(&mut agent);
        assert!(outcome.collected && !outcome.captured);
        assert_eq!(session.lives(), 0);
        assert_eq!(session.status(), Status::GameOver(Loss::Frozen));
        assert_eq!(session.level(), 1, "No level change on game over");
        assert_eq!(agent.exploration_rate(), 0.0, "No level decay on game over");

        let pursuers = session.world().pursuers.clone();
        assert_eq!(
            session.tick(&mut agent),
            TickOutcome::default(),
            "Finished game ignores ticks"
        );
        assert_eq!(session.world().pursuers, pursuers, "Pursuers stay put");
    }

    #[test]
    fn ticker_start_stop() {
        let mut ticker = Ticker::new(Duration::from_millis(5));
        assert!(!ticker.wait(), "Stopped ticker does not tick");

        ticker.start();
        ticker.start();
        assert!(ticker.is_running());
        let begin = Instant::now();
        assert!(ticker.wait());
        assert!(ticker.wait());
        assert!(begin.elapsed() >= Duration::from_millis(9), "Two periods elapsed");

        ticker.stop();
        assert!(!ticker.is_running());
    }
}
