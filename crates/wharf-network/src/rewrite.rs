//! Runtime rewriting of loopback bindings.
//!
//! A binding on `127.0.0.1` would only be reachable from the host itself.
//! Servers that ask for a local address are published on the bridge
//! interface instead, so other containers can still reach them. Under
//! isolated network mode those bindings are dropped entirely.

use wharf_common::config::{self, DockerNetworkSettings};

use crate::allocation::Allocations;
use crate::binding::{PortBinding, PortMap};

/// Loopback address that triggers rewriting.
pub const LOOPBACK: &str = "127.0.0.1";

/// Network policy applied to bindings before they reach the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPolicy {
    /// Address substituted for loopback bindings.
    pub bridge_interface_ip: String,
    /// Drop loopback bindings instead of rewriting them.
    pub isolated_network: bool,
}

impl NetworkPolicy {
    /// Create a policy.
    pub fn new(bridge_interface_ip: impl Into<String>, isolated_network: bool) -> Self {
        Self {
            bridge_interface_ip: bridge_interface_ip.into(),
            isolated_network,
        }
    }

    /// Create a policy from network settings.
    #[must_use]
    pub fn from_settings(settings: &DockerNetworkSettings) -> Self {
        Self::new(settings.interface.clone(), settings.ispn)
    }

    /// Resolve the policy from the current process-wide configuration.
    ///
    /// The configuration is read on every call; nothing is cached.
    #[must_use]
    pub fn current() -> Self {
        Self::from_settings(&config::get().docker.network)
    }

    fn apply(&self, binding: &PortBinding) -> Option<PortBinding> {
        if binding.host_ip != LOOPBACK {
            return Some(binding.clone());
        }

        if self.isolated_network {
            tracing::trace!(host_port = %binding.host_port, "Dropping loopback binding");
            return None;
        }

        tracing::trace!(
            host_port = %binding.host_port,
            interface = %self.bridge_interface_ip,
            "Rewriting loopback binding"
        );
        Some(PortBinding::new(
            self.bridge_interface_ip.clone(),
            binding.host_port.clone(),
        ))
    }
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self::from_settings(&DockerNetworkSettings::default())
    }
}

/// Apply the network policy to a binding table.
///
/// Bindings on [`LOOPBACK`] are moved to the bridge interface address, or
/// dropped when the network is isolated. Every other binding is kept as is.
/// Retained bindings keep their relative order, and a port whose bindings
/// are all dropped stays in the table with an empty list.
#[must_use]
pub fn rewrite_for_runtime(bindings: &PortMap, policy: &NetworkPolicy) -> PortMap {
    let out: PortMap = bindings
        .iter()
        .map(|(port, binds)| {
            let retained: Vec<PortBinding> =
                binds.iter().filter_map(|b| policy.apply(b)).collect();
            (*port, retained)
        })
        .collect();

    tracing::debug!(
        isolated = policy.isolated_network,
        before = bindings.binding_count(),
        after = out.binding_count(),
        "Applied network policy to bindings"
    );
    out
}

impl Allocations {
    /// Port bindings for this allocation with the network policy applied.
    #[must_use]
    pub fn docker_bindings(&self, policy: &NetworkPolicy) -> PortMap {
        rewrite_for_runtime(&self.bindings(), policy)
    }

    /// Port bindings using the current process-wide network policy.
    #[must_use]
    pub fn docker_bindings_current(&self) -> PortMap {
        self.docker_bindings(&NetworkPolicy::current())
    }
}
