//! Port bindings for the container runtime.
//!
//! [`build_bindings`] expands an allocation table into a [`PortMap`]: for
//! every publishable port, one TCP and one UDP binding on the IPv6 wildcard
//! address. The IP an allocation is grouped under does not select the bind
//! address; binding to `[::]` exposes the port on every address of the host.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::allocation::Allocations;
use crate::port::{ContainerPort, Protocol};

/// Address every allocation is bound on.
pub const IPV6_WILDCARD: &str = "[::]";

/// A host address and port a container port is published on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortBinding {
    /// Host IP to bind to.
    #[serde(rename = "HostIp")]
    pub host_ip: String,
    /// Host port to bind to.
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

impl PortBinding {
    /// Create a new binding.
    pub fn new(host_ip: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port: host_port.into(),
        }
    }

    /// Create a binding on the IPv6 wildcard address.
    #[must_use]
    pub fn wildcard(port: u16) -> Self {
        Self::new(IPV6_WILDCARD, port.to_string())
    }
}

/// Bindings for each protocol-qualified container port.
///
/// A port may carry several bindings; their order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMap(BTreeMap<ContainerPort, Vec<PortBinding>>);

impl PortMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding for a port.
    pub fn push(&mut self, port: ContainerPort, binding: PortBinding) {
        self.0.entry(port).or_default().push(binding);
    }

    /// Set the bindings for a port, replacing any existing ones.
    pub fn insert(&mut self, port: ContainerPort, bindings: Vec<PortBinding>) {
        self.0.insert(port, bindings);
    }

    /// Bindings for a port.
    #[must_use]
    pub fn get(&self, port: &ContainerPort) -> Option<&[PortBinding]> {
        self.0.get(port).map(Vec::as_slice)
    }

    /// Whether a port is present, even with no bindings.
    #[must_use]
    pub fn contains(&self, port: &ContainerPort) -> bool {
        self.0.contains_key(port)
    }

    /// Iterate over the ports in order.
    pub fn keys(&self) -> impl Iterator<Item = &ContainerPort> {
        self.0.keys()
    }

    /// Iterate over ports and their bindings in order.
    pub fn iter(&self) -> btree_map::Iter<'_, ContainerPort, Vec<PortBinding>> {
        self.0.iter()
    }

    /// Number of ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of bindings across all ports.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(ContainerPort, Vec<PortBinding>)> for PortMap {
    fn from_iter<I: IntoIterator<Item = (ContainerPort, Vec<PortBinding>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PortMap {
    type Item = (&'a ContainerPort, &'a Vec<PortBinding>);
    type IntoIter = btree_map::Iter<'a, ContainerPort, Vec<PortBinding>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build the port bindings for an allocation table.
///
/// Ports outside `1..=65535` are skipped. A port listed more than once
/// receives one binding per listing.
#[must_use]
pub fn build_bindings(allocations: &Allocations) -> PortMap {
    let mut out = PortMap::new();

    // The key IP is not bound to; an IPv4 binding on it is intentionally
    // not produced.
    for (ip, ports) in allocations.mappings() {
        for &port in ports {
            let Some(tcp) = ContainerPort::from_raw(port, Protocol::Tcp) else {
                tracing::trace!(ip = %ip, port, "Skipping invalid port");
                continue;
            };

            let binding = PortBinding::wildcard(tcp.port());
            out.push(tcp.with_protocol(Protocol::Udp), binding.clone());
            out.push(tcp, binding);
        }
    }

    tracing::debug!(
        ports = out.len(),
        bindings = out.binding_count(),
        "Built port bindings"
    );
    out
}

impl Allocations {
    /// Port bindings for this allocation, before runtime rewriting.
    ///
    /// Use [`Allocations::docker_bindings`] to apply the network policy.
    #[must_use]
    pub fn bindings(&self) -> PortMap {
        build_bindings(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn allocations(entries: &[(&str, &[i64])]) -> Allocations {
        Allocations::new(
            entries
                .iter()
                .map(|(ip, ports)| ((*ip).to_string(), ports.to_vec()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn port(s: &str) -> ContainerPort {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_port_produces_tcp_and_udp() {
        let bindings = build_bindings(&allocations(&[("0.0.0.0", &[25565])]));

        assert_eq!(bindings.len(), 2);
        for key in ["25565/tcp", "25565/udp"] {
            assert_eq!(
                bindings.get(&port(key)).unwrap(),
                [PortBinding::new("[::]", "25565")]
            );
        }
    }

    #[test]
    fn test_key_ip_is_not_bound() {
        let bindings = build_bindings(&allocations(&[("127.0.0.1", &[8080])]));
        let tcp = bindings.get(&port("8080/tcp")).unwrap();
        assert_eq!(tcp[0].host_ip, IPV6_WILDCARD);
    }

    #[test]
    fn test_different_ips_collapse_to_same_binding() {
        let bindings = build_bindings(&allocations(&[
            ("10.0.0.1", &[7777]),
            ("10.0.0.2", &[7777]),
        ]));

        assert_eq!(bindings.len(), 2);
        assert_eq!(
            bindings.get(&port("7777/udp")).unwrap(),
            [PortBinding::wildcard(7777), PortBinding::wildcard(7777)]
        );
    }

    #[test]
    fn test_invalid_ports_skipped() {
        let bindings = build_bindings(&allocations(&[("a", &[0, -5, 70000, 65536, 8080])]));

        let keys: Vec<String> = bindings.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["8080/tcp", "8080/udp"]);
        assert_eq!(bindings.binding_count(), 2);
    }

    #[test]
    fn test_boundary_ports() {
        let bindings = build_bindings(&allocations(&[("a", &[1, 65535])]));
        assert!(bindings.contains(&port("1/tcp")));
        assert!(bindings.contains(&port("65535/udp")));
        assert_eq!(bindings.len(), 4);
    }

    #[test]
    fn test_empty_mappings() {
        assert!(build_bindings(&Allocations::default()).is_empty());
        assert!(build_bindings(&allocations(&[("a", &[])])).is_empty());
    }

    #[test]
    fn test_mappings_not_mutated() {
        let allocations = allocations(&[("a", &[0, 8080])]);
        let before = allocations.clone();
        let _ = allocations.bindings();
        assert_eq!(allocations, before);
    }

    #[test]
    fn test_serialize_runtime_shape() {
        let bindings = build_bindings(&allocations(&[("a", &[25565])]));
        let json = serde_json::to_value(&bindings).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "25565/tcp": [{"HostIp": "[::]", "HostPort": "25565"}],
                "25565/udp": [{"HostIp": "[::]", "HostPort": "25565"}],
            })
        );
    }

    #[test]
    fn test_deserialize_rejects_aliased_keys() {
        let result: Result<PortMap, _> = serde_json::from_str(
            r#"{"+80/tcp": [{"HostIp": "127.0.0.1", "HostPort": "80"}], "80/tcp": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_external_table() {
        let map: PortMap = serde_json::from_str(
            r#"{"80/tcp": [{"HostIp": "127.0.0.1", "HostPort": "80"}], "53/udp": []}"#,
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.binding_count(), 1);
        assert!(map.get(&port("53/udp")).unwrap().is_empty());
    }
}
