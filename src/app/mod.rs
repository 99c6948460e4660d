//! Application layer: configuration and the dependency injection container.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  app::App (DI container)                 │
//! │    owns ──▶ adapters (MsgPack, InMemory) │
//! │    implements ──▶ ports::LearnerRepository│
//! │    creates ──▶ agents (SARSA, Q, DoubleQ)│
//! └──────────────────────────────────────────┘
//! ```
//!
//! [`ExperimentConfig`] reads a whole experiment (maze, learning parameters,
//! episode budget) from a TOML or JSON file.

pub mod config;
pub mod container;

pub use config::{ExperimentConfig, LearnerConfig, LearningConfig, MazeConfig, MazeKindName};
pub use container::{App, AppBuilder};
