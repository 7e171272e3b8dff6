//! # CoinMatch Common Library
//!
//! Shared code for the CoinMatch provenance backend:
//! - Database initialization and schema
//! - Record models (museum coins, candidate listings, match records)
//! - Merge functions for field-by-field upserts
//! - Configuration loading
//! - Password hashing and session token helpers

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
