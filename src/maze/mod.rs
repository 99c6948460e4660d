//! Grid maze environment
//!
//! A maze is a `width × height` grid of [`State`]s. Each state carries the
//! reward an agent receives on entering it, and may be terminal. `(0, 0)` is
//! the bottom-left cell and [`Action::Up`] increases `y`.
//!
//! Three movement models are supported through [`MazeKind`]:
//!
//! | Kind | Off-grid move | Noise |
//! |------|---------------|-------|
//! | `Strict` | error | none |
//! | `Bounded` | stay in place | none |
//! | `Stochastic` | stay in place | intended action replaced with probability `slip` |

pub mod action;
pub mod grid;
pub mod state;
pub mod transition;

pub use action::{Action, Coordinate};
pub use grid::{Maze, MazeKind};
pub use state::State;
pub use transition::Transition;
