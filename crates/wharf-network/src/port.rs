//! Protocol-qualified container ports.
//!
//! A [`ContainerPort`] is the key used by both the binding table and the
//! exposure set, written as `<port>/<protocol>` (for example `25565/tcp`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use wharf_common::{WharfError, WharfResult};

/// Transport protocol of a published port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    /// TCP protocol.
    Tcp,
    /// UDP protocol.
    Udp,
}

impl Protocol {
    /// Get the protocol string used in port identifiers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = WharfError;

    fn from_str(s: &str) -> WharfResult<Self> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            _ => Err(WharfError::InvalidPort {
                value: s.to_string(),
            }),
        }
    }
}

/// A port number qualified by its protocol.
///
/// Ordered by port number first, then TCP before UDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerPort {
    port: u16,
    protocol: Protocol,
}

impl ContainerPort {
    /// Lowest port that can be published.
    pub const MIN: i64 = 1;
    /// Highest port that can be published.
    pub const MAX: i64 = 65535;

    /// Create a new port identifier.
    ///
    /// Returns `None` for port 0, which can never be published.
    #[must_use]
    pub const fn new(port: u16, protocol: Protocol) -> Option<Self> {
        if port == 0 {
            return None;
        }
        Some(Self { port, protocol })
    }

    /// Create a TCP port identifier.
    #[must_use]
    pub const fn tcp(port: u16) -> Option<Self> {
        Self::new(port, Protocol::Tcp)
    }

    /// Create a UDP port identifier.
    #[must_use]
    pub const fn udp(port: u16) -> Option<Self> {
        Self::new(port, Protocol::Udp)
    }

    /// Create a port identifier from an unchecked allocation value.
    ///
    /// Values outside `1..=65535` yield `None`.
    #[must_use]
    pub fn from_raw(port: i64, protocol: Protocol) -> Option<Self> {
        if !(Self::MIN..=Self::MAX).contains(&port) {
            return None;
        }
        u16::try_from(port)
            .ok()
            .and_then(|port| Self::new(port, protocol))
    }

    /// The same port number with another protocol.
    #[must_use]
    pub const fn with_protocol(self, protocol: Protocol) -> Self {
        Self {
            port: self.port,
            protocol,
        }
    }

    /// The port number.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The protocol.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }
}

impl fmt::Display for ContainerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

impl FromStr for ContainerPort {
    type Err = WharfError;

    fn from_str(s: &str) -> WharfResult<Self> {
        let invalid = || WharfError::InvalidPort {
            value: s.to_string(),
        };

        let (port, protocol) = s.split_once('/').ok_or_else(invalid)?;
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        let protocol: Protocol = protocol.parse().map_err(|_| invalid())?;

        Self::new(port, protocol).ok_or_else(invalid)
    }
}

impl Serialize for ContainerPort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContainerPort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
