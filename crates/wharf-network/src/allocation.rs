//! Server allocations.
//!
//! An [`Allocations`] value holds the operator-declared ports for a server,
//! grouped by the IP they were assigned on. Nothing is validated here; port
//! values outside the publishable range are filtered when bindings are built.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use wharf_common::WharfResult;

/// The default allocation of a server.
///
/// Used for `{SERVER_IP}` and `{SERVER_PORT}` when templating configuration
/// files and startup arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultMapping {
    /// IP address.
    pub ip: String,
    /// Port number.
    pub port: i64,
}

/// The allocations available to a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allocations {
    /// Source-NAT outgoing traffic to the default mapping's IP.
    pub force_outgoing_ip: bool,
    /// The default allocation.
    #[serde(rename = "default", deserialize_with = "null_as_default")]
    pub default_mapping: DefaultMapping,
    /// Ports assigned to the server, keyed by the IP they belong to.
    #[serde(deserialize_with = "null_mappings")]
    pub mappings: BTreeMap<String, Vec<i64>>,
}

/// Treat an explicit `null` like a missing value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A `null` table or a `null` port list reads as empty.
fn null_mappings<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mappings: Option<BTreeMap<String, Option<Vec<i64>>>> = Option::deserialize(deserializer)?;
    Ok(mappings
        .unwrap_or_default()
        .into_iter()
        .map(|(ip, ports)| (ip, ports.unwrap_or_default()))
        .collect())
}

impl Allocations {
    /// Create allocations from a mapping table.
    #[must_use]
    pub fn new(mappings: BTreeMap<String, Vec<i64>>) -> Self {
        Self {
            mappings,
            ..Self::default()
        }
    }

    /// Parse allocations from their JSON representation.
    pub fn from_json(json: &str) -> WharfResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default mapping.
    #[must_use]
    pub fn with_default(mut self, ip: impl Into<String>, port: i64) -> Self {
        self.default_mapping = DefaultMapping {
            ip: ip.into(),
            port,
        };
        self
    }

    /// Enable forcing the outgoing IP.
    #[must_use]
    pub fn with_force_outgoing_ip(mut self, force: bool) -> Self {
        self.force_outgoing_ip = force;
        self
    }

    /// Whether outgoing traffic is forced through the default IP.
    #[must_use]
    pub const fn force_outgoing_ip(&self) -> bool {
        self.force_outgoing_ip
    }

    /// The default allocation.
    #[must_use]
    pub const fn default_mapping(&self) -> &DefaultMapping {
        &self.default_mapping
    }

    /// The allocation table.
    #[must_use]
    pub const fn mappings(&self) -> &BTreeMap<String, Vec<i64>> {
        &self.mappings
    }

    /// The IP outgoing traffic should be source-NAT'd to, if forced.
    #[must_use]
    pub fn outgoing_ip(&self) -> Option<&str> {
        self.force_outgoing_ip
            .then_some(self.default_mapping.ip.as_str())
    }
}
