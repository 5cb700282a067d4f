use serde::{Deserialize, Serialize};

/// Reward shaping parameters
///
/// Live play and pretraining use different sets, see [`RewardParams::LIVE`] and
/// [`RewardParams::PRETRAIN`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Added to every step
    pub step_cost: f32,
    /// Bonus when the pursuer lands on the target
    pub capture: f32,
    /// Bonus when any collectible was consumed this tick
    pub collect: f32,
    /// Bonus for closing in on the target
    pub closer: f32,
    /// Bonus (negative) for falling back
    pub farther: f32,
}

impl RewardParams {
    pub const LIVE: Self = Self {
        step_cost: -0.05,
        capture: 10.0,
        collect: 5.0,
        closer: 0.3,
        farther: -0.1,
    };

    pub const PRETRAIN: Self = Self {
        step_cost: -0.02,
        capture: 15.0,
        collect: 8.0,
        closer: 0.5,
        farther: -0.2,
    };

    /// Shape the reward for one pursuer's step
    ///
    /// The step cost is always paid. On top of it exactly one of capture, collection, or distance
    /// change applies, in that priority.
    pub fn shape(&self, events: StepEvents) -> f32 {
        let bonus = if events.captured {
            self.capture
        } else if events.collected {
            self.collect
        } else if events.dist_after < events.dist_before {
            self.closer
        } else if events.dist_after > events.dist_before {
            self.farther
        } else {
            0.0
        };
        self.step_cost + bonus
    }
}

impl Default for RewardParams {
    fn default() -> Self {
        Self::LIVE
    }
}

/// What happened to one pursuer during a tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepEvents {
    /// This pursuer ended on the target
    pub captured: bool,
    /// Any pursuer consumed a collectible this tick
    pub collected: bool,
    /// Manhattan distance to the target before the move
    pub dist_before: i32,
    /// Manhattan distance to the target after the move
    pub dist_after: i32,
}
