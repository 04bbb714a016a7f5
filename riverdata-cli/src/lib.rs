//! RiverData CLI - cached river readings from the command line.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod summary;
