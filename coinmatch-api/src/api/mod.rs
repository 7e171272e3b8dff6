//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod coins;
pub mod health;
pub mod matches;
pub mod search;
