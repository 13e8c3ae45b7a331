//! Subcommands of the `qlearn` binary

pub mod evaluate;
pub mod train;
