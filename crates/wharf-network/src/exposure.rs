//! Exposed port sets.
//!
//! The runtime needs to know which container ports exist independently of
//! where they are bound. A [`PortSet`] serializes as an object whose values
//! are empty objects, e.g. `{"25565/tcp": {}}`.

use std::collections::{BTreeSet, btree_set};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::allocation::Allocations;
use crate::binding::PortMap;
use crate::port::ContainerPort;
use crate::rewrite::NetworkPolicy;

/// Set of exposed container ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet(BTreeSet<ContainerPort>);

impl PortSet {
    /// Whether a port is exposed.
    #[must_use]
    pub fn contains(&self, port: &ContainerPort) -> bool {
        self.0.contains(port)
    }

    /// Iterate over the exposed ports in order.
    pub fn iter(&self) -> btree_set::Iter<'_, ContainerPort> {
        self.0.iter()
    }

    /// Number of exposed ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no port is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ContainerPort> for PortSet {
    fn from_iter<I: IntoIterator<Item = ContainerPort>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a ContainerPort;
    type IntoIter = btree_set::Iter<'a, ContainerPort>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Serialize)]
struct Empty {}

impl Serialize for PortSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for port in &self.0 {
            map.serialize_entry(port, &Empty {})?;
        }
        map.end()
    }
}

/// Collect the ports present in a binding table.
///
/// Every key counts, including ports left with no bindings.
#[must_use]
pub fn exposed_ports(bindings: &PortMap) -> PortSet {
    bindings.keys().copied().collect()
}

impl Allocations {
    /// Ports to expose for this allocation with the network policy applied.
    #[must_use]
    pub fn exposed(&self, policy: &NetworkPolicy) -> PortSet {
        exposed_ports(&self.docker_bindings(policy))
    }

    /// Ports to expose using the current process-wide network policy.
    #[must_use]
    pub fn exposed_current(&self) -> PortSet {
        self.exposed(&NetworkPolicy::current())
    }
}
