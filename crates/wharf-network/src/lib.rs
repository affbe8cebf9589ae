//! # wharf-network
//!
//! Translates a server's allocation table into the structures a container
//! runtime needs to publish its ports on the host.
//!
//! The translation is a pure pipeline:
//!
//! 1. [`build_bindings`] expands every valid allocated port into a TCP and a
//!    UDP binding on the IPv6 wildcard address.
//! 2. [`rewrite_for_runtime`] rewrites or drops loopback bindings according
//!    to the [`NetworkPolicy`].
//! 3. [`exposed_ports`] reduces the bindings to the set of exposed ports.
//!
//! ```
//! use wharf_network::{Allocations, NetworkPolicy};
//!
//! let allocations = Allocations::from_json(r#"{"mappings": {"0.0.0.0": [25565]}}"#).unwrap();
//! let policy = NetworkPolicy::new("172.18.0.1", false);
//!
//! let bindings = allocations.docker_bindings(&policy);
//! assert_eq!(bindings.len(), 2);
//!
//! let exposed = allocations.exposed(&policy);
//! assert!(exposed.contains(&"25565/udp".parse().unwrap()));
//! ```

#![warn(missing_docs)]

pub mod allocation;
pub mod binding;
pub mod exposure;
pub mod port;
pub mod rewrite;

pub use allocation::{Allocations, DefaultMapping};
pub use binding::{IPV6_WILDCARD, PortBinding, PortMap, build_bindings};
pub use exposure::{PortSet, exposed_ports};
pub use port::{ContainerPort, Protocol};
pub use rewrite::{LOOPBACK, NetworkPolicy, rewrite_for_runtime};
