//! CLI infrastructure for the mazerl toolkit
//!
//! This module provides the command-line interface for training, evaluating,
//! solving and exporting maze learners, running the canned scenarios, and
//! checking documentation navigation scripts.

pub mod commands;
pub mod config;
pub mod output;
