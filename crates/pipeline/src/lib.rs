//! Dashboard assembly pipeline.
//!
//! Fetches every configured plugin through a [`plugdash_wporg::source::PluginSource`],
//! builds and scores a record for each, and returns the plugins sorted
//! worst-first. One plugin's failure never aborts the run.

pub mod assembler;
pub mod config;
pub mod dashboard;
