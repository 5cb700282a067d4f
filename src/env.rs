use rand::Rng;

use crate::grid::{Grid, Pos};

/// The board as seen by the pursuers during one tick
///
/// Owned by whoever drives the game. The pursuers are moved by
/// [`EpisodeRunner::step`](crate::runner::EpisodeRunner::step), everything else is read only from
/// the learner's side except that consumed collectibles are removed.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub grid: Grid,
    pub pursuers: Vec<Pos>,
    pub target: Pos,
    pub collectibles: Vec<Pos>,
}

/// Result of checking every pursuer against the target and the collectibles
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    /// Per pursuer, whether it ended on the target
    pub captured: Vec<bool>,
    /// Number of collectibles removed
    pub consumed: usize,
}

impl Detection {
    pub fn any_captured(&self) -> bool {
        self.captured.iter().any(|&c| c)
    }

    pub fn any_consumed(&self) -> bool {
        self.consumed > 0
    }
}

impl World {
    pub fn new(grid: Grid, pursuers: Vec<Pos>, target: Pos, collectibles: Vec<Pos>) -> Self {
        Self {
            grid,
            pursuers,
            target,
            collectibles,
        }
    }

    /// A board with the target and `pursuers` pursuers dropped on uniformly random cells, plus
    /// `collectibles` items on cells not occupied by any of them
    pub fn random(grid: Grid, pursuers: usize, collectibles: usize, rng: &mut impl Rng) -> Self {
        let target = grid.random_cell(rng);
        let pursuers: Vec<Pos> = (0..pursuers).map(|_| grid.random_cell(rng)).collect();

        let mut agents = pursuers.clone();
        agents.push(target);
        let collectibles = (0..collectibles)
            .filter_map(|_| grid.random_vacant(&agents, rng))
            .collect();

        Self::new(grid, pursuers, target, collectibles)
    }

    /// Check capture and collection for all pursuers at once
    ///
    /// Every collectible under any pursuer is removed in a single pass, so the order of the
    /// pursuers never matters.
    pub fn detect(&mut self) -> Detection {
        let captured = self.pursuers.iter().map(|&p| p == self.target).collect();
        let before = self.collectibles.len();
        let pursuers = &self.pursuers;
        self.collectibles.retain(|c| !pursuers.contains(c));

        Detection {
            captured,
            consumed: before - self.collectibles.len(),
        }
    }
}
