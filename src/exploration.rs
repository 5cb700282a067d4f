use rand::Rng;

use crate::decay::Decay;

/// Exploration policy result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

impl Choice {
    /// Explore with probability `epsilon`
    ///
    /// A uniform draw in `[0, 1)` below `epsilon` explores, so `epsilon = 0` always exploits and
    /// `epsilon = 1` always explores.
    pub fn roll(epsilon: f32, rng: &mut impl Rng) -> Self {
        if rng.gen::<f32>() < epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// The time index is whatever the owner counts: episodes during pretraining, cleared levels
/// during live play.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration rate at time `t`
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Step;

    #[test]
    fn extremes_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(Choice::roll(0.0, &mut rng), Choice::Exploit, "epsilon 0 exploits");
            assert_eq!(Choice::roll(1.0, &mut rng), Choice::Explore, "epsilon 1 explores");
        }
    }

    #[test]
    fn explore_frequency_tracks_epsilon() {
        let mut rng = StdRng::seed_from_u64(2);
        let trials = 20_000;
        let explored = (0..trials)
            .filter(|_| Choice::roll(0.3, &mut rng) == Choice::Explore)
            .count();
        let freq = explored as f32 / trials as f32;
        assert!((freq - 0.3).abs() < 0.02, "Explore frequency {freq} close to 0.3");
    }

    #[test]
    fn epsilon_follows_schedule() {
        let policy = EpsilonGreedy::new(Step::new(0.9, 0.2, 0.02, 1.0).unwrap());
        assert_eq!(policy.epsilon(0), 0.2);
        assert!(policy.epsilon(1) < policy.epsilon(0), "Decays over time");
        assert_eq!(policy.epsilon(500), 0.02, "Floored");
    }
}
