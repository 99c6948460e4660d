//! Greedy policy over learned action values.

use crate::{
    Error, Result,
    agents::ActionValueTable,
    maze::{Action, Maze, State},
    ports::Policy,
};

/// Always takes the highest-valued available action.
///
/// Unvisited states read as all zeros, so the first available action wins.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    table: ActionValueTable,
}

impl GreedyPolicy {
    pub fn new(table: ActionValueTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.table
    }
}

impl Policy for GreedyPolicy {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        let available = maze.available_actions(state.position);
        self.table
            .greedy(state.position, &available)
            .map(Some)
            .ok_or(Error::NoAvailableActions {
                coordinate: state.position,
            })
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}
