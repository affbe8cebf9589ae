//! # wharf-common
//!
//! Shared utilities and types for the Wharf port binding tools.
//!
//! This crate provides common functionality used across all Wharf crates:
//! - Common error types
//! - The process-wide configuration store

#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{DockerNetworkSettings, DockerSettings, Settings};
pub use error::{WharfError, WharfResult};
