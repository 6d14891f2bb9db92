//! # rackflow common library
//!
//! Shared code for the rackflow workspace:
//! - Common error type
//! - TOML configuration file model and loading
//! - Default configuration path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
