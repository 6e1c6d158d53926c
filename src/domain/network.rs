// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Interface Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("IP address is required for static IP assignment")]
    MissingStaticAddress,

    #[error("Invalid IPv4 address: {0}")]
    InvalidIpAddress(String),

    #[error("Loopback addresses not allowed: {0}")]
    Loopback(Ipv4Addr),

    #[error("Multicast addresses not allowed: {0}")]
    Multicast(Ipv4Addr),

    #[error("Reserved IP addresses not allowed: {0}")]
    Reserved(Ipv4Addr),

    #[error("IP addresses ending with .1 are not allowed (typically reserved for network gateway): {0}")]
    GatewayAddress(Ipv4Addr),

    #[error("Private network IP address should be in a private network range (192.168.x.x, 10.x.x.x, or 172.16-31.x.x): {0}")]
    NotPrivateRange(Ipv4Addr),

    #[error("Invalid netmask format: {0}")]
    InvalidNetmask(String),

    #[error("CIDR notation must be between /0 and /32: {0}")]
    InvalidCidr(String),

    #[error("Bridge interface name cannot be empty")]
    EmptyBridge,

    #[error("Bridge interface name contains invalid characters: {0}")]
    InvalidBridge(String),

    #[error("Port forwarding requires both host and guest ports")]
    MissingPorts,

    #[error("Port number must be between 1 and 65535: {0}")]
    InvalidPort(u32),
}

/// Network interface kinds understood by Vagrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    PrivateNetwork,
    PublicNetwork,
    ForwardedPort,
}

impl NetworkType {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrivateNetwork => "private_network",
            Self::PublicNetwork => "public_network",
            Self::ForwardedPort => "forwarded_port",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IP address assignment method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpAssignment {
    Static,
    #[default]
    Dhcp,
}

/// Port forwarding protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

/// Options that relax network validation rules
///
/// Passed explicitly into construction and validation. The transport layer
/// derives it per request (see [`ValidationOptions::from_header_value`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Accept non-private addresses on `private_network` interfaces
    #[serde(default)]
    pub allow_public_ips_in_private_networks: bool,
}

impl ValidationOptions {
    /// Options that accept public addresses on private networks
    pub fn allow_public_ips() -> Self {
        Self {
            allow_public_ips_in_private_networks: true,
        }
    }

    /// Derive options from an inbound request header value
    ///
    /// `"true"`, `"1"` and `"yes"` (case-insensitive) enable the override;
    /// anything else, including a missing header, keeps the strict default.
    pub fn from_header_value(value: Option<&str>) -> Self {
        let allow = value
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        Self {
            allow_public_ips_in_private_networks: allow,
        }
    }
}

/// Netmask value object
///
/// Accepts dotted-decimal (`255.255.255.0`) or CIDR suffix (`/24`) notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Netmask {
    Dotted(Ipv4Addr),
    Prefix(u8),
}

impl Netmask {
    /// Default netmask for static interfaces
    pub const DEFAULT: &'static str = "255.255.255.0";

    /// Maximum IPv4 prefix length
    pub const MAX_PREFIX: u8 = 32;

    /// Parse a netmask from either notation
    pub fn new(mask: impl AsRef<str>) -> Result<Self, NetworkError> {
        let mask = mask.as_ref().trim();

        if let Some(prefix) = mask.strip_prefix('/') {
            let prefix = prefix
                .parse::<u8>()
                .map_err(|_| NetworkError::InvalidCidr(mask.to_string()))?;
            if prefix > Self::MAX_PREFIX {
                return Err(NetworkError::InvalidCidr(mask.to_string()));
            }
            return Ok(Self::Prefix(prefix));
        }

        Ipv4Addr::from_str(mask)
            .map(Self::Dotted)
            .map_err(|_| NetworkError::InvalidNetmask(mask.to_string()))
    }

    /// Prefix length, if the mask is a contiguous run of ones
    pub fn prefix_len(&self) -> Option<u8> {
        match self {
            Self::Prefix(p) => Some(*p),
            Self::Dotted(addr) => {
                let bits = u32::from(*addr);
                let ones = bits.leading_ones();
                if bits.checked_shl(ones).unwrap_or(0) == 0 {
                    u8::try_from(ones).ok()
                } else {
                    None
                }
            }
        }
    }

    /// Dotted-decimal form of the mask
    pub fn to_dotted(&self) -> Ipv4Addr {
        match self {
            Self::Dotted(addr) => *addr,
            Self::Prefix(0) => Ipv4Addr::UNSPECIFIED,
            Self::Prefix(p) => Ipv4Addr::from(u32::MAX << (32 - u32::from(*p))),
        }
    }
}

impl Default for Netmask {
    fn default() -> Self {
        Self::Dotted(Ipv4Addr::new(255, 255, 255, 0))
    }
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dotted(addr) => write!(f, "{}", addr),
            Self::Prefix(p) => write!(f, "/{}", p),
        }
    }
}

impl FromStr for Netmask {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Parse a dotted IPv4 address
pub fn parse_ipv4(address: &str) -> Result<Ipv4Addr, NetworkError> {
    Ipv4Addr::from_str(address.trim())
        .map_err(|_| NetworkError::InvalidIpAddress(address.to_string()))
}

/// Whether the address falls inside 240.0.0.0/4 (includes broadcast)
pub fn is_reserved(ip: &Ipv4Addr) -> bool {
    ip.octets()[0] >= 240
}

/// Check an address against the rules every interface address must satisfy
///
/// # Invariants
/// - Not loopback, multicast or reserved
/// - Does not end in `.1`
pub fn check_address(ip: Ipv4Addr) -> Result<Ipv4Addr, NetworkError> {
    if ip.is_loopback() {
        return Err(NetworkError::Loopback(ip));
    }
    if ip.is_multicast() {
        return Err(NetworkError::Multicast(ip));
    }
    if is_reserved(&ip) {
        return Err(NetworkError::Reserved(ip));
    }
    if ip.octets()[3] == 1 {
        return Err(NetworkError::GatewayAddress(ip));
    }
    Ok(ip)
}

/// Raw network interface data as supplied by a caller or a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub network_type: NetworkType,

    #[serde(default)]
    pub ip_assignment: IpAssignment,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub netmask: Option<String>,

    #[serde(default)]
    pub bridge: Option<String>,

    #[serde(default)]
    pub host_port: Option<u32>,

    #[serde(default)]
    pub guest_port: Option<u32>,

    #[serde(default)]
    pub protocol: Protocol,
}

impl NetworkInterfaceDraft {
    /// Start a draft of the given type with DHCP assignment and defaults
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            id: None,
            network_type,
            ip_assignment: IpAssignment::Dhcp,
            ip_address: None,
            netmask: None,
            bridge: None,
            host_port: None,
            guest_port: None,
            protocol: Protocol::Tcp,
        }
    }

    pub fn static_ip(mut self, address: impl Into<String>) -> Self {
        self.ip_assignment = IpAssignment::Static;
        self.ip_address = Some(address.into());
        self
    }

    pub fn netmask(mut self, netmask: impl Into<String>) -> Self {
        self.netmask = Some(netmask.into());
        self
    }

    pub fn bridge(mut self, bridge: impl Into<String>) -> Self {
        self.bridge = Some(bridge.into());
        self
    }

    pub fn ports(mut self, guest: u32, host: u32) -> Self {
        self.guest_port = Some(guest);
        self.host_port = Some(host);
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Network interface attached to a virtual machine
///
/// Invariants (enforced by [`NetworkInterface::new`]):
/// - Static assignment carries an address
/// - Addresses are valid IPv4, not loopback/multicast/reserved, not `.1`
/// - `private_network` addresses are in a private range unless overridden
/// - Netmask is dotted-decimal or `/0`-`/32`
/// - `forwarded_port` has both ports in 1-65535
///
/// Fields are public for reading; the validation engine re-checks them so a
/// record that was altered after construction is still caught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterface {
    pub id: String,

    #[serde(rename = "type")]
    pub network_type: NetworkType,

    pub ip_assignment: IpAssignment,

    pub ip_address: Option<String>,

    pub netmask: String,

    pub bridge: Option<String>,

    pub host_port: Option<u16>,

    pub guest_port: Option<u16>,

    pub protocol: Protocol,
}

impl NetworkInterface {
    /// Minimum valid port
    pub const MIN_PORT: u32 = 1;

    /// Maximum valid port
    pub const MAX_PORT: u32 = 65535;

    /// Construct a network interface, enforcing all invariants
    pub fn new(
        draft: NetworkInterfaceDraft,
        options: &ValidationOptions,
    ) -> Result<Self, NetworkError> {
        let ip_address = draft
            .ip_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        match &ip_address {
            None if draft.ip_assignment == IpAssignment::Static => {
                return Err(NetworkError::MissingStaticAddress);
            }
            None => {}
            Some(address) => {
                let ip = check_address(parse_ipv4(address)?)?;
                if draft.network_type == NetworkType::PrivateNetwork
                    && !options.allow_public_ips_in_private_networks
                    && !ip.is_private()
                {
                    return Err(NetworkError::NotPrivateRange(ip));
                }
            }
        }

        let netmask = match draft.netmask.as_deref().map(str::trim) {
            None | Some("") => Netmask::DEFAULT.to_string(),
            Some(mask) => {
                Netmask::new(mask)?;
                mask.to_string()
            }
        };

        let bridge = draft.bridge.map(validate_bridge).transpose()?;

        let host_port = draft.host_port.map(validate_port).transpose()?;
        let guest_port = draft.guest_port.map(validate_port).transpose()?;
        if draft.network_type == NetworkType::ForwardedPort
            && (host_port.is_none() || guest_port.is_none())
        {
            return Err(NetworkError::MissingPorts);
        }

        Ok(Self {
            id: draft.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            network_type: draft.network_type,
            ip_assignment: draft.ip_assignment,
            ip_address,
            netmask,
            bridge,
            host_port,
            guest_port,
            protocol: draft.protocol,
        })
    }

    /// Private network with a static address
    pub fn private_static(
        address: impl Into<String>,
        options: &ValidationOptions,
    ) -> Result<Self, NetworkError> {
        Self::new(
            NetworkInterfaceDraft::new(NetworkType::PrivateNetwork).static_ip(address),
            options,
        )
    }

    /// Private network with DHCP assignment
    pub fn private_dhcp() -> Result<Self, NetworkError> {
        Self::new(
            NetworkInterfaceDraft::new(NetworkType::PrivateNetwork),
            &ValidationOptions::default(),
        )
    }

    /// Public (bridged) network, optionally pinned to a host interface
    pub fn public(bridge: Option<&str>) -> Result<Self, NetworkError> {
        let mut draft = NetworkInterfaceDraft::new(NetworkType::PublicNetwork);
        draft.bridge = bridge.map(str::to_string);
        Self::new(draft, &ValidationOptions::default())
    }

    /// Port forward from host to guest
    pub fn forwarded_port(guest: u32, host: u32, protocol: Protocol) -> Result<Self, NetworkError> {
        Self::new(
            NetworkInterfaceDraft::new(NetworkType::ForwardedPort)
                .ports(guest, host)
                .protocol(protocol),
            &ValidationOptions::default(),
        )
    }

    /// Whether this interface uses static IP assignment
    pub fn is_static(&self) -> bool {
        self.ip_assignment == IpAssignment::Static
    }

    /// Whether this is a port forwarding configuration
    pub fn is_forwarded_port(&self) -> bool {
        self.network_type == NetworkType::ForwardedPort
    }

    /// The address claimed by a static assignment, if any
    pub fn static_address(&self) -> Option<&str> {
        if self.is_static() {
            self.ip_address.as_deref()
        } else {
            None
        }
    }

    /// Convert back to draft form for storage
    pub fn to_draft(&self) -> NetworkInterfaceDraft {
        NetworkInterfaceDraft {
            id: Some(self.id.clone()),
            network_type: self.network_type,
            ip_assignment: self.ip_assignment,
            ip_address: self.ip_address.clone(),
            netmask: Some(self.netmask.clone()),
            bridge: self.bridge.clone(),
            host_port: self.host_port.map(u32::from),
            guest_port: self.guest_port.map(u32::from),
            protocol: self.protocol,
        }
    }
}

fn validate_bridge(bridge: String) -> Result<String, NetworkError> {
    let bridge = bridge.trim().to_string();
    if bridge.is_empty() {
        return Err(NetworkError::EmptyBridge);
    }
    if !bridge
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(NetworkError::InvalidBridge(bridge));
    }
    Ok(bridge)
}

fn validate_port(port: u32) -> Result<u16, NetworkError> {
    if !(NetworkInterface::MIN_PORT..=NetworkInterface::MAX_PORT).contains(&port) {
        return Err(NetworkError::InvalidPort(port));
    }
    u16::try_from(port).map_err(|_| NetworkError::InvalidPort(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn test_static_private_network() {
        let iface = NetworkInterface::private_static("192.168.33.10", &strict()).unwrap();
        assert!(iface.is_static());
        assert_eq!(iface.static_address(), Some("192.168.33.10"));
        assert_eq!(iface.netmask, "255.255.255.0");
        assert!(!iface.id.is_empty());
    }

    #[test]
    fn test_static_requires_address() {
        let mut draft = NetworkInterfaceDraft::new(NetworkType::PrivateNetwork);
        draft.ip_assignment = IpAssignment::Static;
        assert_eq!(
            NetworkInterface::new(draft, &strict()),
            Err(NetworkError::MissingStaticAddress)
        );
    }

    #[test]
    fn test_rejected_addresses() {
        let cases = [
            ("127.0.0.5", "loopback"),
            ("224.0.0.5", "multicast"),
            ("240.0.0.5", "reserved"),
            ("255.255.255.255", "broadcast"),
            ("192.168.1.1", "gateway"),
            ("999.1.1.5", "syntax"),
            ("10.0.0", "syntax"),
        ];
        for (address, why) in cases {
            assert!(
                NetworkInterface::private_static(address, &strict()).is_err(),
                "{} should be rejected ({})",
                address,
                why
            );
        }
    }

    #[test]
    fn test_private_range_override() {
        assert_eq!(
            NetworkInterface::private_static("8.8.8.8", &strict()),
            Err(NetworkError::NotPrivateRange(Ipv4Addr::new(8, 8, 8, 8)))
        );
        assert!(
            NetworkInterface::private_static("8.8.8.8", &ValidationOptions::allow_public_ips())
                .is_ok()
        );
    }

    #[test]
    fn test_private_ranges_accepted() {
        for address in ["10.0.0.5", "172.16.0.5", "172.31.255.5", "192.168.0.5"] {
            assert!(NetworkInterface::private_static(address, &strict()).is_ok());
        }
        assert!(NetworkInterface::private_static("172.32.0.5", &strict()).is_err());
    }

    #[test]
    fn test_public_address_allowed_on_public_network() {
        let draft = NetworkInterfaceDraft::new(NetworkType::PublicNetwork).static_ip("8.8.8.8");
        assert!(NetworkInterface::new(draft, &strict()).is_ok());
    }

    #[test]
    fn test_netmask_forms() {
        assert_eq!(Netmask::new("/24").unwrap().prefix_len(), Some(24));
        assert_eq!(Netmask::new("255.255.0.0").unwrap().prefix_len(), Some(16));
        assert_eq!(Netmask::new("255.0.255.0").unwrap().prefix_len(), None);
        assert_eq!(
            Netmask::new("/20").unwrap().to_dotted(),
            Ipv4Addr::new(255, 255, 240, 0)
        );
        assert_eq!(Netmask::new("/0").unwrap().to_dotted(), Ipv4Addr::UNSPECIFIED);
        assert!(Netmask::new("/33").is_err());
        assert!(Netmask::new("/x").is_err());
        assert!(Netmask::new("255.255.255").is_err());
    }

    #[test]
    fn test_netmask_kept_on_entity() {
        let draft = NetworkInterfaceDraft::new(NetworkType::PrivateNetwork)
            .static_ip("10.1.2.3")
            .netmask("/16");
        let iface = NetworkInterface::new(draft, &strict()).unwrap();
        assert_eq!(iface.netmask, "/16");
    }

    #[test]
    fn test_forwarded_port_requires_both_ports() {
        let mut draft = NetworkInterfaceDraft::new(NetworkType::ForwardedPort);
        draft.guest_port = Some(80);
        assert_eq!(
            NetworkInterface::new(draft, &strict()),
            Err(NetworkError::MissingPorts)
        );
        assert!(NetworkInterface::forwarded_port(80, 8080, Protocol::Tcp).is_ok());
        assert_eq!(
            NetworkInterface::forwarded_port(0, 8080, Protocol::Tcp),
            Err(NetworkError::InvalidPort(0))
        );
        assert_eq!(
            NetworkInterface::forwarded_port(80, 65536, Protocol::Tcp),
            Err(NetworkError::InvalidPort(65536))
        );
    }

    #[test]
    fn test_bridge_validation() {
        assert!(NetworkInterface::public(Some("en0")).is_ok());
        assert_eq!(
            NetworkInterface::public(Some("  ")),
            Err(NetworkError::EmptyBridge)
        );
        assert!(NetworkInterface::public(Some("en0: Wi-Fi")).is_err());
    }

    #[test]
    fn test_header_value_options() {
        assert!(ValidationOptions::from_header_value(Some("true")).allow_public_ips_in_private_networks);
        assert!(ValidationOptions::from_header_value(Some("1")).allow_public_ips_in_private_networks);
        assert!(!ValidationOptions::from_header_value(Some("false")).allow_public_ips_in_private_networks);
        assert!(!ValidationOptions::from_header_value(None).allow_public_ips_in_private_networks);
    }

    #[test]
    fn test_draft_round_trip_preserves_id() {
        let iface = NetworkInterface::forwarded_port(80, 8080, Protocol::Udp).unwrap();
        let rebuilt = NetworkInterface::new(iface.to_draft(), &strict()).unwrap();
        assert_eq!(iface, rebuilt);
    }
}
