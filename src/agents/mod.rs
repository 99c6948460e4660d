//! Maze agents
//!
//! Every agent implements [`Learner`](crate::ports::Learner) and is driven
//! by the training pipeline one transition at a time.
//!
//! | Agent | Learns | Behaviour |
//! |-------|--------|-----------|
//! | [`PolicyAgent`] | nothing | a fixed [`Policy`](crate::ports::Policy), optionally failing |
//! | [`TemporalDifferenceAgent`] | `V(s)` | a fixed policy |
//! | [`SarsaAgent`] | `Q^π` | ε-greedy, on-policy |
//! | [`QLearningAgent`] | `Q*` | ε-greedy, off-policy |
//! | [`DoubleQAgent`] | `Q*` with two tables | ε-greedy on `Q₁ + Q₂` |
//!
//! ```no_run
//! use mazerl::agents::{LearningParams, QLearningAgent, SarsaAgent};
//!
//! let params = LearningParams::new(0.1, 0.9, 0.1)?
//!     .with_epsilon_decay(0.995, 0.01)?;
//! let q_agent = QLearningAgent::new(params).with_seed(7);
//! let sarsa_agent = SarsaAgent::new(params).with_seed(7);
//! # Ok::<(), mazerl::Error>(())
//! ```

pub mod control;
pub mod double_q;
pub mod params;
pub mod policy_agent;
pub mod serialization;
pub mod table;
pub mod td;

pub use control::{QLearningAgent, SarsaAgent};
pub use double_q::DoubleQAgent;
pub use params::{LearningParams, build_rng};
pub use policy_agent::PolicyAgent;
pub use serialization::{Algorithm, LoadedLearner, SavedLearner, TrainingMetadata};
pub use table::ActionValueTable;
pub use td::TemporalDifferenceAgent;
