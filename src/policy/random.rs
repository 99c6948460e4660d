//! Uniformly random policy.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    agents::build_rng,
    maze::{Action, Maze, State},
    ports::Policy,
};

/// Picks uniformly among the actions the maze allows in a state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        let actions = maze.available_actions(state.position);
        actions
            .choose(&mut self.rng)
            .copied()
            .map(Some)
            .ok_or(Error::NoAvailableActions {
                coordinate: state.position,
            })
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Coordinate, MazeKind};

    #[test]
    fn test_strict_corner_only_offers_in_grid_moves() {
        let maze = Maze::uniform(3, 3, 0.0, MazeKind::Strict).unwrap();
        let corner = *maze.state(Coordinate::new(0, 0)).unwrap();
        let mut policy = RandomPolicy::new().with_seed(3);
        for _ in 0..50 {
            let action = policy.select_action(&maze, &corner).unwrap().unwrap();
            assert!(matches!(action, Action::Up | Action::Right));
        }
    }

    #[test]
    fn test_terminal_has_no_action() {
        let mut maze = Maze::uniform(2, 2, 0.0, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(1, 1)).unwrap();
        let terminal = *maze.state(Coordinate::new(1, 1)).unwrap();
        let mut policy = RandomPolicy::new().with_seed(3);
        assert_eq!(policy.select_action(&maze, &terminal).unwrap(), None);
    }

    #[test]
    fn test_seeded_policies_agree() {
        let maze = Maze::uniform(3, 3, 0.0, MazeKind::Bounded).unwrap();
        let state = *maze.state(Coordinate::new(1, 1)).unwrap();
        let mut a = RandomPolicy::new().with_seed(42);
        let mut b = RandomPolicy::new().with_seed(42);
        for _ in 0..20 {
            assert_eq!(
                a.select_action(&maze, &state).unwrap(),
                b.select_action(&maze, &state).unwrap()
            );
        }
    }
}
