//! Learning parameters, exploration and RNG helpers shared by the agents.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::table::argmax;
use crate::{Result, maze::Action, types::UnitInterval};

/// Step size, discount and ε-greedy exploration schedule.
///
/// After every episode `epsilon ← max(epsilon · epsilon_decay, min_epsilon)`.
/// The default decay of `1.0` keeps exploration constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Learning rate α
    pub alpha: UnitInterval,
    /// Discount factor γ
    pub gamma: UnitInterval,
    /// Initial exploration rate ε
    pub epsilon: UnitInterval,
    pub epsilon_decay: UnitInterval,
    pub min_epsilon: UnitInterval,
}

impl LearningParams {
    pub fn new(alpha: f64, gamma: f64, epsilon: f64) -> Result<Self> {
        Ok(Self {
            alpha: UnitInterval::new("alpha", alpha)?,
            gamma: UnitInterval::new("gamma", gamma)?,
            epsilon: UnitInterval::new("epsilon", epsilon)?,
            epsilon_decay: UnitInterval::ONE,
            min_epsilon: UnitInterval::ZERO,
        })
    }

    pub fn with_epsilon_decay(mut self, decay: f64, min_epsilon: f64) -> Result<Self> {
        self.epsilon_decay = UnitInterval::new("epsilon_decay", decay)?;
        self.min_epsilon = UnitInterval::new("min_epsilon", min_epsilon)?;
        Ok(self)
    }

    pub fn with_gamma(mut self, gamma: f64) -> Result<Self> {
        self.gamma = UnitInterval::new("gamma", gamma)?;
        Ok(self)
    }

    /// Exploration rate after one more episode.
    pub fn decayed(&self, epsilon: f64) -> f64 {
        (epsilon * self.epsilon_decay.value()).max(self.min_epsilon.value())
    }
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: UnitInterval::new_unchecked(0.1),
            gamma: UnitInterval::new_unchecked(0.9),
            epsilon: UnitInterval::new_unchecked(0.1),
            epsilon_decay: UnitInterval::ONE,
            min_epsilon: UnitInterval::ZERO,
        }
    }
}

pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// ε-greedy choice among `available`.
///
/// The greedy action is computed first; with probability `epsilon` it is
/// replaced by a uniform draw from `available`, which may pick it again.
pub(crate) fn epsilon_greedy<R, F>(
    rng: &mut R,
    epsilon: f64,
    available: &[Action],
    value: F,
) -> Option<Action>
where
    R: Rng + ?Sized,
    F: Fn(Action) -> f64,
{
    let greedy = argmax(available, value)?;
    if rng.random::<f64>() < epsilon {
        available.choose(rng).copied()
    } else {
        Some(greedy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(LearningParams::new(0.1, 0.9, 0.1).is_ok());
        assert!(LearningParams::new(1.1, 0.9, 0.1).is_err());
        assert!(LearningParams::new(0.1, -0.1, 0.1).is_err());
        assert!(
            LearningParams::new(0.1, 0.9, 0.1)
                .unwrap()
                .with_epsilon_decay(2.0, 0.0)
                .is_err()
        );
    }

    #[test]
    fn test_decay_respects_floor() {
        let params = LearningParams::new(0.1, 0.9, 0.5)
            .unwrap()
            .with_epsilon_decay(0.5, 0.2)
            .unwrap();
        assert!((params.decayed(0.5) - 0.25).abs() < 1e-12);
        assert!((params.decayed(0.25) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_default_decay_is_constant() {
        let params = LearningParams::default();
        assert_eq!(params.decayed(0.1), 0.1);
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let mut rng = build_rng(Some(1));
        let values = [0.0, 3.0, 3.0, 1.0];
        for _ in 0..20 {
            let action = epsilon_greedy(&mut rng, 0.0, &Action::ALL, |a| values[a.index()]);
            assert_eq!(action, Some(Action::Down));
        }
    }

    #[test]
    fn test_full_epsilon_stays_within_available() {
        let mut rng = build_rng(Some(2));
        let available = [Action::Up, Action::Right];
        for _ in 0..50 {
            let action = epsilon_greedy(&mut rng, 1.0, &available, |_| 0.0).unwrap();
            assert!(available.contains(&action));
        }
    }
}
