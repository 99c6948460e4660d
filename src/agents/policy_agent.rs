//! An agent that follows a fixed policy and never learns.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::params::build_rng;
use crate::{
    Result,
    maze::{Action, Maze, State},
    ports::{Learner, Policy},
    types::UnitInterval,
};

/// Follows a [`Policy`], optionally failing to perform the desired action.
///
/// With a success probability `p < 1`, the desired action is swapped with
/// probability `1 - p` for a uniformly random *other* action among the
/// state's [destinations](Maze::destinations). On a bounded maze those
/// include wall bumps. If there is no other destination the desired
/// action stands.
pub struct PolicyAgent {
    policy: Box<dyn Policy>,
    success: UnitInterval,
    rng: StdRng,
    rng_seed: Option<u64>,
    last_slip: Option<(Action, Action)>,
}

impl PolicyAgent {
    pub fn new(policy: Box<dyn Policy>) -> Self {
        Self {
            policy,
            success: UnitInterval::ONE,
            rng: build_rng(None),
            rng_seed: None,
            last_slip: None,
        }
    }

    pub fn with_success_probability(mut self, probability: f64) -> Result<Self> {
        self.success = UnitInterval::new("probability", probability)?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self.policy.set_rng_seed(seed.wrapping_add(1));
        self
    }

    pub fn success_probability(&self) -> f64 {
        self.success.value()
    }

    /// `(desired, performed)` if the most recent selection failed.
    pub fn last_slip(&self) -> Option<(Action, Action)> {
        self.last_slip
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }
}

impl Learner for PolicyAgent {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        self.last_slip = None;
        let Some(desired) = self.policy.select_action(maze, state)? else {
            return Ok(None);
        };

        if self.rng.random::<f64>() <= self.success.value() {
            return Ok(Some(desired));
        }

        let alternatives: Vec<Action> = maze
            .destinations(state)?
            .into_iter()
            .map(|(action, _)| action)
            .filter(|&action| action != desired)
            .collect();
        let performed = alternatives.choose(&mut self.rng).copied().unwrap_or(desired);
        if performed != desired {
            tracing::debug!(
                %desired,
                %performed,
                at = %state.position,
                "agent failed to perform its desired action"
            );
            self.last_slip = Some((desired, performed));
        }
        Ok(Some(performed))
    }

    fn name(&self) -> &str {
        "Policy"
    }

    fn reset(&mut self) -> Result<()> {
        self.rng = build_rng(self.rng_seed);
        self.last_slip = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self.policy.set_rng_seed(seed.wrapping_add(1));
        Ok(())
    }
}
