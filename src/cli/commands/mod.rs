//! Subcommands of the `mazerl` binary. Each exposes a clap `…Args` type and
//! an `execute` function.

pub mod evaluate;
pub mod export;
pub mod navcheck;
pub mod scenario;
pub mod solve;
pub mod train;
