//! CLI infrastructure for the qlearn toolkit
//!
//! This module provides the command-line interface for training agents on the
//! built-in environments and evaluating saved Q-tables.

pub mod commands;
pub mod config;
pub mod output;
