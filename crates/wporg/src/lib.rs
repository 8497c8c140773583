//! WordPress.org API client.
//!
//! Provides typed wrappers for the plugin-information, statistics, and core
//! version-check endpoints, plus the [`source::PluginSource`] boundary the
//! dashboard pipeline fetches through.

pub mod api;
pub mod source;
