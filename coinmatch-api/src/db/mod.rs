//! Database access layer for coinmatch-api
//!
//! One module per table. Every function takes `&mut SqliteConnection` so
//! callers decide the transaction boundary: handlers that mutate open one
//! transaction, run the unit of work, and commit on success.

pub mod candidates;
pub mod coins;
pub mod matches;
pub mod search_jobs;
pub mod sessions;
pub mod users;
