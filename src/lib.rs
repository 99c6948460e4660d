//! Tabular reinforcement learning on grid mazes
//!
//! This crate provides:
//! - Strict, bounded and stochastic grid mazes
//! - Fixed, random, hard-coded and value-iteration policies
//! - TD(0) evaluation, SARSA, Q-learning and double Q-learning agents
//! - An observer-driven training pipeline and canned assignment scenarios
//! - A validator for Doxygen sidebar navigation scripts

pub mod adapters;
pub mod agents;
pub mod app;
pub mod cli;
pub mod docnav;
pub mod error;
pub mod maze;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod render;
pub mod scenarios;
pub mod types;

pub use error::{Error, Result};
