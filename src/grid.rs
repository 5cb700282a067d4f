use std::collections::HashSet;

use rand::{seq::IteratorRandom, Rng};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, VariantArray};

/// Default board width
pub const COLS: i32 = 10;
/// Default board height
pub const ROWS: i32 = 6;

/// A cell on the board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`
    pub fn manhattan(&self, other: Pos) -> i32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    /// The neighbouring cell in the direction of `action`, without any legality check
    pub fn offset(self, action: Action) -> Pos {
        let (dx, dy) = action.delta();
        Pos::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A pursuer move. The discriminant is the slot of the action in a Q-table row.
#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(usize)]
pub enum Action {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
    Stay = 4,
}

/// Number of actions available to a pursuer
pub const NUM_ACTIONS: usize = Action::VARIANTS.len();

impl Action {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Uniformly random action
    pub fn random(rng: &mut impl Rng) -> Self {
        Action::VARIANTS[rng.gen_range(0..NUM_ACTIONS)]
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Stay => (0, 0),
        }
    }
}

/// Board geometry: bounds plus the set of blocked cells
///
/// Obstacles are fixed for the lifetime of a level, a new level builds a new `Grid`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cols: i32,
    rows: i32,
    obstacles: HashSet<Pos>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(COLS, ROWS)
    }
}

impl Grid {
    /// An empty board of `cols` x `rows` cells
    ///
    /// **Panics** if either dimension is not positive
    pub fn new(cols: i32, rows: i32) -> Self {
        assert!(cols > 0 && rows > 0, "Grid dimensions must be positive.");
        Self {
            cols,
            rows,
            obstacles: HashSet::new(),
        }
    }

    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = Pos>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn obstacles(&self) -> &HashSet<Pos> {
        &self.obstacles
    }

    pub fn add_obstacle(&mut self, pos: Pos) {
        self.obstacles.insert(pos);
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.cols && pos.y < self.rows
    }

    /// A cell can be entered iff it is on the board and not an obstacle
    pub fn can_move(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && !self.obstacles.contains(&pos)
    }

    /// Apply `action` to `pos`
    ///
    /// An illegal move is not an error: the original position is returned, which makes a blocked
    /// move indistinguishable from [`Action::Stay`].
    pub fn resolve(&self, pos: Pos, action: Action) -> Pos {
        let candidate = pos.offset(action);
        if self.can_move(candidate) {
            candidate
        } else {
            pos
        }
    }

    /// A uniformly random cell anywhere on the board, obstacles included
    pub fn random_cell(&self, rng: &mut impl Rng) -> Pos {
        Pos::new(rng.gen_range(0..self.cols), rng.gen_range(0..self.rows))
    }

    /// A uniformly random cell that is neither an obstacle nor in `occupied`
    ///
    /// Returns `None` when the board is full.
    pub fn random_vacant(&self, occupied: &[Pos], rng: &mut impl Rng) -> Option<Pos> {
        (0..self.cols)
            .flat_map(|x| (0..self.rows).map(move |y| Pos::new(x, y)))
            .filter(|p| !self.obstacles.contains(p) && !occupied.contains(p))
            .choose(rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn grid_moves() {
        let grid = Grid::new(10, 6);
        let p = Pos::new(5, 3);

        assert_eq!(grid.resolve(p, Action::Up), Pos::new(5, 2), "Up action works");
        assert_eq!(grid.resolve(p, Action::Right), Pos::new(6, 3), "Right action works");
        assert_eq!(grid.resolve(p, Action::Down), Pos::new(5, 4), "Down action works");
        assert_eq!(grid.resolve(p, Action::Left), Pos::new(4, 3), "Left action works");
        assert_eq!(grid.resolve(p, Action::Stay), p, "Stay action works");
    }

    #[test]
    fn blocked_moves_are_stay() {
        let grid = Grid::new(10, 6).with_obstacles([Pos::new(1, 0)]);
        let corner = Pos::new(0, 0);
        let stay = grid.resolve(corner, Action::Stay);

        assert_eq!(grid.resolve(corner, Action::Up), stay, "Off-grid up is a no-op");
        assert_eq!(grid.resolve(corner, Action::Left), stay, "Off-grid left is a no-op");
        assert_eq!(grid.resolve(corner, Action::Right), stay, "Obstacle blocks move");
        assert_eq!(grid.resolve(corner, Action::Down), Pos::new(0, 1), "Open cell accepted");

        let far = Pos::new(9, 5);
        assert_eq!(grid.resolve(far, Action::Right), far, "Right edge is a no-op");
        assert_eq!(grid.resolve(far, Action::Down), far, "Bottom edge is a no-op");
    }

    #[test]
    fn action_indices() {
        for (i, action) in Action::iter().enumerate() {
            assert_eq!(action.index(), i, "Index matches declaration order");
            assert_eq!(Action::from_repr(i), Some(action), "Index round trips");
        }
        assert_eq!(NUM_ACTIONS, 5);
    }

    #[test]
    fn random_vacant_avoids_occupied() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::new(2, 2).with_obstacles([Pos::new(0, 0)]);
        let occupied = [Pos::new(1, 0), Pos::new(0, 1)];

        for _ in 0..20 {
            assert_eq!(
                grid.random_vacant(&occupied, &mut rng),
                Some(Pos::new(1, 1)),
                "Only free cell is chosen"
            );
        }

        let full = [Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)];
        assert!(grid.random_vacant(&full, &mut rng).is_none(), "Full board yields none");
    }
}
