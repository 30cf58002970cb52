//! Ferry Server Library
//!
//! This library exposes the server's internal modules for integration testing.

pub mod args;
pub mod config;
pub mod connection;
pub mod listing;
pub mod paths;
pub mod tracker;
