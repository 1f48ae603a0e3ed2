//! Local network interface probe
//!
//! The node's own subnet is part of the default `NO_PROXY` allowlist. The
//! probe sits behind a trait so plan generation can run against a fixed
//! interface list.

use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, SocketAddrV6};

use crate::Result;

/// An address assigned to a local interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub prefix_len: u8,
}

impl InterfaceAddress {
    pub fn new(ip: impl Into<IpAddr>, prefix_len: u8) -> Self {
        Self {
            ip: ip.into(),
            prefix_len,
        }
    }
}

impl std::fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

/// Source of local interface addresses.
pub trait InterfaceProbe {
    /// All addresses on all interfaces, in enumeration order.
    fn interface_addresses(&self) -> Result<Vec<InterfaceAddress>>;

    /// First non-loopback IPv4 address with its prefix, e.g. `192.168.1.10/24`.
    ///
    /// Probe failures are logged and yield `None`.
    fn node_cidr(&self) -> Option<String> {
        match self.interface_addresses() {
            Ok(addresses) => first_node_cidr(&addresses),
            Err(e) => {
                tracing::warn!(error = %e, "Could not enumerate network interfaces");
                None
            }
        }
    }
}

/// Pick the first non-loopback IPv4 address.
pub fn first_node_cidr(addresses: &[InterfaceAddress]) -> Option<String> {
    addresses
        .iter()
        .find(|addr| matches!(addr.ip, IpAddr::V4(ip) if !ip.is_loopback()))
        .map(ToString::to_string)
}

/// Reads the host's interfaces via `getifaddrs(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl InterfaceProbe for SystemProbe {
    fn interface_addresses(&self) -> Result<Vec<InterfaceAddress>> {
        let mut addresses = Vec::new();
        for ifaddr in nix::ifaddrs::getifaddrs()? {
            let Some(address) = ifaddr.address.as_ref() else {
                continue;
            };

            if let Some(sin) = address.as_sockaddr_in() {
                let ip = *SocketAddrV4::from(*sin).ip();
                let prefix_len = ifaddr
                    .netmask
                    .as_ref()
                    .and_then(|mask| mask.as_sockaddr_in())
                    .map(|mask| u32::from(*SocketAddrV4::from(*mask).ip()).count_ones() as u8)
                    .unwrap_or(32);
                addresses.push(InterfaceAddress::new(ip, prefix_len));
            } else if let Some(sin6) = address.as_sockaddr_in6() {
                let ip = *SocketAddrV6::from(*sin6).ip();
                let prefix_len = ifaddr
                    .netmask
                    .as_ref()
                    .and_then(|mask| mask.as_sockaddr_in6())
                    .map(|mask| u128::from(*SocketAddrV6::from(*mask).ip()).count_ones() as u8)
                    .unwrap_or(128);
                addresses.push(InterfaceAddress::new(ip, prefix_len));
            }
        }
        tracing::debug!(count = addresses.len(), "Enumerated interface addresses");
        Ok(addresses)
    }
}

/// A fixed interface list.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    addresses: Vec<InterfaceAddress>,
}

impl StaticProbe {
    pub fn new(addresses: Vec<InterfaceAddress>) -> Self {
        Self { addresses }
    }

    /// Loopback plus one IPv4 address.
    pub fn single(ip: Ipv4Addr, prefix_len: u8) -> Self {
        Self::new(vec![
            InterfaceAddress::new(Ipv4Addr::LOCALHOST, 8),
            InterfaceAddress::new(ip, prefix_len),
        ])
    }
}

impl InterfaceProbe for StaticProbe {
    fn interface_addresses(&self) -> Result<Vec<InterfaceAddress>> {
        Ok(self.addresses.clone())
    }
}
