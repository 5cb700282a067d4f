use serde::{Deserialize, Serialize};

use crate::{assert_interval, grid::Action, state::StateKey};

use super::QTable;

/// Configuration for the [`Learner`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// The learning rate
    ///
    /// **Default**: `0.6`
    pub alpha: f32,
    /// The discount factor
    ///
    /// **Default**: `0.8`
    pub gamma: f32,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            gamma: 0.8,
        }
    }
}

/// Represents a single transition observed by one pursuer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exp {
    /// The state before the pursuer moved
    pub state: StateKey,
    /// The action taken in that state
    pub action: Action,
    /// The shaped reward for the step
    pub reward: f32,
    /// The state after the move
    pub next_state: StateKey,
}

/// One-step Q-learning update rule
///
/// Q(s,a) ← Q(s,a) + α(r + γ max<sub>a'</sub> Q(s',a') − Q(s,a))
#[derive(Clone, Debug, PartialEq)]
pub struct Learner {
    alpha: f32,
    gamma: f32,
}

impl Default for Learner {
    fn default() -> Self {
        Self::new(LearnerConfig::default())
    }
}

impl Learner {
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: LearnerConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            alpha: config.alpha,
            gamma: config.gamma,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Move Q(`state`, `action`) toward `reward` plus the discounted best value of `next_state`
    pub fn update(
        &self,
        table: &mut QTable,
        state: StateKey,
        action: Action,
        reward: f32,
        next_state: StateKey,
    ) {
        table.ensure(next_state);
        let best_next = table.max_value(next_state);
        let q = &mut table.ensure(state)[action.index()];
        *q += self.alpha * (reward + self.gamma * best_next - *q);
    }

    /// Learn from a given experience
    pub fn learn(&self, table: &mut QTable, exp: Exp) {
        let Exp {
            state,
            action,
            reward,
            next_state,
        } = exp;
        self.update(table, state, action, reward, next_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DistanceBucket;

    #[test]
    fn update_example() {
        let mut table = QTable::new();
        let learner = Learner::default();
        let s = StateKey::new(-1, -1, DistanceBucket::Far);
        let s_next = StateKey::new(-1, -1, DistanceBucket::Mid);

        learner.update(&mut table, s, Action::Left, 5.0, s_next);

        assert!(
            (table.get(s).unwrap()[Action::Left.index()] - 3.0).abs() < 1e-6,
            "0.6 * (5 + 0.8 * 0 - 0) = 3"
        );
        assert_eq!(table.get(s_next), Some(&[0.0; 5]), "Next state materialized");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn update_moves_toward_target() {
        let learner = Learner::default();
        let s = StateKey::new(1, 0, DistanceBucket::Near);
        let s_next = StateKey::new(0, 0, DistanceBucket::Near);

        for (prior, reward, next_best) in [(0.0, 1.0, 2.0), (4.0, -1.0, 0.5), (-2.0, 10.0, -3.0)] {
            let mut table = QTable::new();
            table.ensure(s)[Action::Down.index()] = prior;
            table.ensure(s_next)[Action::Stay.index()] = next_best;
            let target = reward + learner.gamma() * table.max_value(s_next);

            learner.update(&mut table, s, Action::Down, reward, s_next);
            let updated = table.get(s).unwrap()[Action::Down.index()];

            let (lo, hi) = if prior < target { (prior, target) } else { (target, prior) };
            assert!(
                updated > lo && updated < hi,
                "{updated} strictly between {prior} and {target}"
            );
        }
    }

    #[test]
    fn self_transition_uses_pre_update_value() {
        let learner = Learner::default();
        let s = StateKey::new(0, 0, DistanceBucket::Near);
        let mut table = QTable::new();
        table.ensure(s)[Action::Stay.index()] = 1.0;

        learner.learn(
            &mut table,
            Exp {
                state: s,
                action: Action::Stay,
                reward: 0.0,
                next_state: s,
            },
        );

        let expected = 1.0 + 0.6 * (0.8 * 1.0 - 1.0);
        assert!((table.get(s).unwrap()[Action::Stay.index()] - expected).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "alpha")]
    fn rejects_bad_alpha() {
        Learner::new(LearnerConfig {
            alpha: 1.5,
            ..Default::default()
        });
    }
}
