/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use anyhow::anyhow;

/// Target host as requested by a proxy client.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Domain(String),
}

impl Host {
    #[inline]
    pub fn is_ip(&self) -> bool {
        matches!(self, Host::Ip(_))
    }

    pub fn domain(&self) -> Option<&str> {
        match self {
            Host::Ip(_) => None,
            Host::Domain(domain) => Some(domain),
        }
    }

    fn from_maybe_mapped_ip6(ip6: Ipv6Addr) -> Self {
        match ip6.to_ipv4_mapped() {
            Some(ip4) => Host::Ip(IpAddr::V4(ip4)),
            None => Host::Ip(IpAddr::V6(ip6)),
        }
    }

    pub fn from_domain_str(domain: &str) -> anyhow::Result<Self> {
        if domain.is_empty() {
            return Err(anyhow!("empty domain"));
        }
        let domain = idna::domain_to_ascii(domain).map_err(|e| anyhow!("invalid domain: {e}"))?;
        Ok(Host::Domain(domain))
    }
}

impl From<IpAddr> for Host {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Host::Ip(ip),
            IpAddr::V6(ip6) => Host::from_maybe_mapped_ip6(ip6),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(IpAddr::V4(ip4)) => write!(f, "{ip4}"),
            Host::Ip(IpAddr::V6(ip6)) => write!(f, "[{ip6}]"),
            Host::Domain(domain) => f.write_str(domain),
        }
    }
}

impl FromStr for Host {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(first) = s.as_bytes().first() else {
            return Err(anyhow!("empty string"));
        };
        match first {
            b'[' => {
                let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                    return Err(anyhow!("unclosed square brackets"));
                };
                let ip6 = Ipv6Addr::from_str(inner)
                    .map_err(|_| anyhow!("invalid ipv6 ip in square brackets"))?;
                Ok(Host::from_maybe_mapped_ip6(ip6))
            }
            b':' => {
                let ip6 = Ipv6Addr::from_str(s).map_err(|_| anyhow!("invalid ipv6 ip"))?;
                Ok(Host::from_maybe_mapped_ip6(ip6))
            }
            _ => match IpAddr::from_str(s) {
                Ok(ip) => Ok(Host::from(ip)),
                Err(_) => Host::from_domain_str(s),
            },
        }
    }
}
