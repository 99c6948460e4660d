//! A single maze cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A position in a maze together with the reward for entering it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub position: Coordinate,
    /// Reward received on entering this state
    pub reward: f64,
    pub terminal: bool,
}

impl State {
    pub fn new(position: Coordinate, reward: f64, terminal: bool) -> Self {
        Self {
            position,
            reward,
            terminal,
        }
    }

    /// Position-only label used as a prefix in value and policy tables.
    pub fn label(&self) -> String {
        format!("({:2},{:^2})", self.position.x, self.position.y)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, r = {:^3}", self.label(), self.reward)
    }
}
