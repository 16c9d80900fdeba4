/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use socket2::Domain;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "Ipv4"),
            AddressFamily::Ipv6 => write!(f, "Ipv6"),
        }
    }
}

impl From<AddressFamily> for Domain {
    fn from(v: AddressFamily) -> Self {
        match v {
            AddressFamily::Ipv4 => Domain::IPV4,
            AddressFamily::Ipv6 => Domain::IPV6,
        }
    }
}

impl From<&IpAddr> for AddressFamily {
    fn from(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

impl From<&SocketAddr> for AddressFamily {
    fn from(addr: &SocketAddr) -> Self {
        AddressFamily::from(&addr.ip())
    }
}

/// Unwrap an ipv4-mapped ipv6 peer address, as seen on dual stack listeners.
pub fn native_socket_addr(orig: SocketAddr) -> SocketAddr {
    match orig {
        SocketAddr::V6(a6) => match a6.ip().to_ipv4_mapped() {
            Some(ip4) => SocketAddr::new(IpAddr::V4(ip4), a6.port()),
            None => orig,
        },
        SocketAddr::V4(_) => orig,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn family() {
        let addr = SocketAddr::from_str("127.0.0.1:80").unwrap();
        assert_eq!(AddressFamily::from(&addr), AddressFamily::Ipv4);
        let addr = SocketAddr::from_str("[::1]:80").unwrap();
        assert_eq!(AddressFamily::from(&addr), AddressFamily::Ipv6);
    }

    #[test]
    fn mapped() {
        let addr = SocketAddr::from_str("[::ffff:192.168.1.1]:8080").unwrap();
        assert_eq!(
            native_socket_addr(addr),
            SocketAddr::from_str("192.168.1.1:8080").unwrap()
        );
        let addr = SocketAddr::from_str("[2001:db8::1]:8080").unwrap();
        assert_eq!(native_socket_addr(addr), addr);
    }
}
