use serde::{Deserialize, Serialize};

use super::{Action, Coordinate};

/// One step of experience: `(s, a, r, s')`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Step index within the episode (0-based)
    pub step: usize,
    pub from: Coordinate,
    pub action: Action,
    pub reward: f64,
    pub to: Coordinate,
    /// Whether `to` is a terminal state
    pub terminal: bool,
}
