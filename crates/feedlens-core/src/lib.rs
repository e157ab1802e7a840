//! Feedlens Core: error type, configuration and data directory layout.

pub mod config;
pub mod error;

pub use config::{DataPaths, FeedlensConfig};
pub use error::{Error, Result};
