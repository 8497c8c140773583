//! Domain logic for the plugin health dashboard.
//!
//! Normalizes raw WordPress.org payloads into [`record::PluginRecord`]s,
//! buckets daily statistics into monthly series, and scores each plugin's
//! maintenance slack. Contains no I/O; all data is passed in by the caller.

pub mod coerce;
pub mod error;
pub mod metadata;
pub mod record;
pub mod relative_time;
pub mod slack;
pub mod timeseries;
pub mod types;
pub mod version;
