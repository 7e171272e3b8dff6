//! Database layer: initialization, schema, and record models

pub mod init;
pub mod models;

pub use init::{create_schema, init_database};

/// Current UTC time as an RFC 3339 string.
///
/// All timestamp columns store RFC 3339 text so lexicographic ordering
/// matches chronological ordering (fetched_at DESC, saved_at DESC).
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
