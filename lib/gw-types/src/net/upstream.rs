/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::anyhow;

use super::Host;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct UpstreamAddr {
    host: Host,
    port: u16,
}

impl UpstreamAddr {
    pub fn new(host: Host, port: u16) -> Self {
        UpstreamAddr { host, port }
    }

    pub fn from_ip_and_port(ip: IpAddr, port: u16) -> Self {
        UpstreamAddr::new(Host::from(ip), port)
    }

    /// Build from a bare host string, which may be an ip address or a domain.
    pub fn from_host_str_and_port(host: &str, port: u16) -> anyhow::Result<Self> {
        let host = Host::from_str(host)?;
        Ok(UpstreamAddr::new(host, port))
    }

    /// Parse `host[:port]`, using `default_port` if no port is given.
    ///
    /// The host part is either a name/ipv4 address without any ':' or an ipv6 address
    /// in square brackets.
    pub fn parse_with_default_port(s: &str, default_port: u16) -> anyhow::Result<Self> {
        let (host_s, port_s) = if s.starts_with('[') {
            let pos = s
                .find(']')
                .ok_or_else(|| anyhow!("unclosed square brackets"))?;
            let (host, left) = s.split_at(pos + 1);
            if left.is_empty() {
                (host, None)
            } else if let Some(port) = left.strip_prefix(':') {
                (host, Some(port))
            } else {
                return Err(anyhow!("unexpected chars after ipv6 address"));
            }
        } else {
            match s.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        if host_s.is_empty() {
            return Err(anyhow!("empty host"));
        }
        if !host_s.starts_with('[') && host_s.contains(':') {
            return Err(anyhow!("ipv6 address should be enclosed in square brackets"));
        }

        let port = match port_s {
            Some(p) => {
                if p.is_empty() || !p.bytes().all(|c| c.is_ascii_digit()) {
                    return Err(anyhow!("invalid port string {p}"));
                }
                u16::from_str(p).map_err(|e| anyhow!("invalid port {p}: {e}"))?
            }
            None => default_port,
        };
        if port == 0 {
            return Err(anyhow!("port 0 is not allowed"));
        }

        let host = Host::from_str(host_s)?;
        Ok(UpstreamAddr::new(host, port))
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match &self.host {
            Host::Ip(ip) => Some(SocketAddr::new(*ip, self.port)),
            Host::Domain(_) => None,
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
