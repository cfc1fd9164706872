//! patch-gen: Incremental Patches for Application Server Distributions
//!
//! Compares an installed distribution with an updated one and records what
//! changed as patch operations. Modules and archives are compared
//! semantically, so rebuilt content that differs only in build noise does
//! not produce operations.

pub mod cli;
pub mod config;
pub mod diff;
pub mod distribution;
pub mod error;
pub mod generate;
pub mod inspect;
pub mod logging;
pub mod optional;
pub mod patch;
pub mod tree;
pub mod types;
