use log::trace;
use rand::Rng;

use crate::{
    algo::{Exp, Learner, QTable},
    env::World,
    reward::{RewardParams, StepEvents},
    state::encode,
};

/// What a tick reports back to the game
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Some pursuer ended on the target
    pub captured: bool,
    /// Some collectible was consumed by a pursuer
    pub collected: bool,
    /// The transition each pursuer learned from, in pursuer order
    pub experiences: Vec<Exp>,
}

impl TickOutcome {
    /// Sum of the rewards handed out this tick
    pub fn total_reward(&self) -> f32 {
        self.experiences.iter().map(|e| e.reward).sum()
    }
}

/// Drives one step-and-learn tick for every pursuer in a [`World`]
///
/// All pursuers share one table. Each one encodes its state, picks an action and moves. Capture
/// and collection are then checked once for everybody before each pursuer learns from its own
/// transition.
#[derive(Clone, Debug)]
pub struct EpisodeRunner {
    learner: Learner,
    rewards: RewardParams,
}

impl EpisodeRunner {
    pub fn new(learner: Learner, rewards: RewardParams) -> Self {
        Self { learner, rewards }
    }

    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    pub fn rewards(&self) -> &RewardParams {
        &self.rewards
    }

    pub fn step(
        &self,
        world: &mut World,
        table: &mut QTable,
        epsilon: f32,
        rng: &mut impl Rng,
    ) -> TickOutcome {
        let target = world.target;

        let mut moves = Vec::with_capacity(world.pursuers.len());
        for pos in world.pursuers.iter_mut() {
            let state = encode(*pos, target);
            let action = table.choose_action(state, epsilon, rng);
            let prev = *pos;
            *pos = world.grid.resolve(prev, action);
            trace!("pursuer {prev:?} in {state} chose {action:?} -> {pos:?}");
            moves.push((state, action, prev));
        }

        let detection = world.detect();
        let collected = detection.any_consumed();

        let experiences = moves
            .into_iter()
            .zip(&world.pursuers)
            .zip(&detection.captured)
            .map(|(((state, action, prev), &pos), &captured)| {
                let events = StepEvents {
                    captured,
                    collected,
                    dist_before: prev.manhattan(target),
                    dist_after: pos.manhattan(target),
                };
                let exp = Exp {
                    state,
                    action,
                    reward: self.rewards.shape(events),
                    next_state: encode(pos, target),
                };
                self.learner.learn(table, exp);
                exp
            })
            .collect();

        TickOutcome {
            captured: detection.any_captured(),
            collected,
            experiences,
        }
    }
}
