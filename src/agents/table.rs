//! Action-value table shared by the tabular control agents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    maze::{Action, Coordinate, Maze},
    policy::HardcodedPolicy,
};

/// `Q(s, a)` for every visited state, stored as `[up, down, left, right]`.
///
/// States are inserted with all four values at `0.0` the first time they are
/// visited. Lookups of unvisited states read as zeros without inserting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TableEntry>", into = "Vec<TableEntry>")]
pub struct ActionValueTable {
    values: HashMap<Coordinate, [f64; 4]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableEntry {
    state: Coordinate,
    values: [f64; 4],
}

impl From<Vec<TableEntry>> for ActionValueTable {
    fn from(entries: Vec<TableEntry>) -> Self {
        Self {
            values: entries.into_iter().map(|e| (e.state, e.values)).collect(),
        }
    }
}

impl From<ActionValueTable> for Vec<TableEntry> {
    fn from(table: ActionValueTable) -> Self {
        let mut entries: Vec<TableEntry> = table
            .values
            .into_iter()
            .map(|(state, values)| TableEntry { state, values })
            .collect();
        entries.sort_by_key(|e| e.state);
        entries
    }
}

impl ActionValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for a visited state.
    pub fn get(&self, coordinate: Coordinate) -> Option<[f64; 4]> {
        self.values.get(&coordinate).copied()
    }

    /// Values for any state; unvisited states are all zeros.
    pub fn values(&self, coordinate: Coordinate) -> [f64; 4] {
        self.get(coordinate).unwrap_or([0.0; 4])
    }

    pub fn value(&self, coordinate: Coordinate, action: Action) -> f64 {
        self.values(coordinate)[action.index()]
    }

    /// Mark a state as visited, inserting zeros if it is new.
    pub fn visit(&mut self, coordinate: Coordinate) -> &mut [f64; 4] {
        self.values.entry(coordinate).or_insert([0.0; 4])
    }

    pub fn set(&mut self, coordinate: Coordinate, action: Action, value: f64) {
        self.visit(coordinate)[action.index()] = value;
    }

    /// Move `Q(s, a)` a step of size `alpha` towards `target`.
    ///
    /// Returns the updated value.
    pub fn update(&mut self, coordinate: Coordinate, action: Action, target: f64, alpha: f64) -> f64 {
        let q = &mut self.visit(coordinate)[action.index()];
        *q += alpha * (target - *q);
        *q
    }

    /// Highest-valued action among `available`, ties to the earliest.
    pub fn greedy(&self, coordinate: Coordinate, available: &[Action]) -> Option<Action> {
        let values = self.values(coordinate);
        argmax(available, |a| values[a.index()])
    }

    /// `max_a Q(s, a)` over `available`; `0.0` if nothing is available.
    pub fn max(&self, coordinate: Coordinate, available: &[Action]) -> f64 {
        let values = self.values(coordinate);
        available
            .iter()
            .map(|a| values[a.index()])
            .fold(None, |best: Option<f64>, q| Some(best.map_or(q, |b| b.max(q))))
            .unwrap_or(0.0)
    }

    /// Elementwise sum of two tables over the union of their states.
    pub fn sum(&self, other: &ActionValueTable) -> ActionValueTable {
        let mut values = self.values.clone();
        for (&state, theirs) in &other.values {
            let ours = values.entry(state).or_insert([0.0; 4]);
            for (q, t) in ours.iter_mut().zip(theirs) {
                *q += t;
            }
        }
        ActionValueTable { values }
    }

    /// Number of visited states.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Visited states in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, [f64; 4])> + '_ {
        let mut entries: Vec<_> = self.values.iter().map(|(&c, &v)| (c, v)).collect();
        entries.sort_by_key(|(c, _)| *c);
        entries.into_iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Greedy policy over the whole maze. Terminal states take no action.
    pub fn derive_policy(&self, maze: &Maze) -> HardcodedPolicy {
        let mut policy = HardcodedPolicy::default();
        for state in maze.states() {
            let action = if state.terminal {
                None
            } else {
                self.greedy(state.position, &maze.available_actions(state.position))
            };
            policy.insert(state.position, action);
        }
        policy
    }
}

/// First action in `candidates` with the strictly highest value.
pub(crate) fn argmax<F>(candidates: &[Action], value: F) -> Option<Action>
where
    F: Fn(Action) -> f64,
{
    let mut best: Option<(Action, f64)> = None;
    for &action in candidates {
        let q = value(action);
        if best.is_none_or(|(_, best_q)| q > best_q) {
            best = Some((action, q));
        }
    }
    best.map(|(action, _)| action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeKind;

    #[test]
    fn test_unvisited_reads_zero_without_inserting() {
        let table = ActionValueTable::new();
        assert_eq!(table.values(Coordinate::new(1, 1)), [0.0; 4]);
        assert_eq!(table.get(Coordinate::new(1, 1)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_visit_inserts_zeros() {
        let mut table = ActionValueTable::new();
        table.visit(Coordinate::new(0, 0));
        assert_eq!(table.get(Coordinate::new(0, 0)), Some([0.0; 4]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_update_moves_towards_target() {
        let mut table = ActionValueTable::new();
        let s = Coordinate::new(0, 0);
        table.set(s, Action::Up, 1.0);
        let updated = table.update(s, Action::Up, 3.0, 0.5);
        assert!((updated - 2.0).abs() < 1e-12);
        assert!((table.value(s, Action::Up) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_ties_go_to_earliest_action() {
        let mut table = ActionValueTable::new();
        let s = Coordinate::new(0, 0);
        table.set(s, Action::Left, 1.0);
        table.set(s, Action::Right, 1.0);
        assert_eq!(table.greedy(s, &Action::ALL), Some(Action::Left));
        assert_eq!(table.greedy(Coordinate::new(5, 5), &Action::ALL), Some(Action::Up));
        assert_eq!(table.greedy(s, &[]), None);
    }

    #[test]
    fn test_max_over_available() {
        let mut table = ActionValueTable::new();
        let s = Coordinate::new(0, 0);
        table.set(s, Action::Up, -3.0);
        table.set(s, Action::Down, 7.0);
        table.set(s, Action::Left, -1.0);
        table.set(s, Action::Right, -2.0);
        assert_eq!(table.max(s, &Action::ALL), 7.0);
        assert_eq!(table.max(s, &[Action::Up, Action::Right]), -2.0);
        assert_eq!(table.max(s, &[]), 0.0);
    }

    #[test]
    fn test_sum() {
        let mut a = ActionValueTable::new();
        let mut b = ActionValueTable::new();
        a.set(Coordinate::new(0, 0), Action::Up, 1.0);
        b.set(Coordinate::new(0, 0), Action::Up, 2.0);
        b.set(Coordinate::new(1, 0), Action::Down, 4.0);
        let total = a.sum(&b);
        assert_eq!(total.value(Coordinate::new(0, 0), Action::Up), 3.0);
        assert_eq!(total.value(Coordinate::new(1, 0), Action::Down), 4.0);
        assert_eq!(total.len(), 2);
    }

    #[test]
    fn test_derive_policy() {
        let mut maze = Maze::uniform(2, 1, 0.0, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(1, 0)).unwrap();
        let mut table = ActionValueTable::new();
        table.set(Coordinate::new(0, 0), Action::Right, 5.0);
        let policy = table.derive_policy(&maze);
        assert_eq!(policy.get(Coordinate::new(0, 0)), Some(Some(Action::Right)));
        assert_eq!(policy.get(Coordinate::new(1, 0)), Some(None));
    }

    #[test]
    fn test_json_uses_entry_list() {
        let mut table = ActionValueTable::new();
        table.set(Coordinate::new(1, 2), Action::Down, 0.5);
        let json = serde_json::to_string(&table).unwrap();
        let back: ActionValueTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
