//! Business logic for the CoinMatch backend
//!
//! Services take `&mut SqliteConnection` and never commit: the calling
//! handler owns the transaction boundary.

pub mod auth;
pub mod decisions;
pub mod ingest;
pub mod matcher;
pub mod search;
