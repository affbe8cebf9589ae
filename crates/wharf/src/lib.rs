//! # Wharf
//!
//! Command line access to the port binding pipeline: load a server's
//! allocations, apply the configured network policy, and print the
//! structures handed to the container runtime.

#![warn(missing_docs)]

pub mod cli;
