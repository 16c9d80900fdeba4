/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use anyhow::anyhow;

const DEFAULT_LISTEN_PORT: u16 = 10080;
const DEFAULT_LISTEN_BACKLOG: u32 = 4096;
const MINIMAL_LISTEN_BACKLOG: u32 = 8;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TcpListenConfig {
    address: SocketAddr,
    ipv6only: bool,
    backlog: u32,
    instance: usize,
}

impl Default for TcpListenConfig {
    fn default() -> Self {
        TcpListenConfig {
            address: SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), DEFAULT_LISTEN_PORT),
            ipv6only: false,
            backlog: DEFAULT_LISTEN_BACKLOG,
            instance: 1,
        }
    }
}

impl TcpListenConfig {
    pub fn new(address: SocketAddr) -> Self {
        TcpListenConfig {
            address,
            ..Default::default()
        }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.address.port() == 0 {
            return Err(anyhow!("no listen port is set"));
        }
        Ok(())
    }

    #[inline]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    #[inline]
    pub fn is_ipv6only(&self) -> bool {
        self.ipv6only
    }

    /// Whether an ipv6 wildcard listener will also accept ipv4 clients
    pub fn is_dual_stack(&self) -> bool {
        match self.address.ip() {
            IpAddr::V4(_) => false,
            IpAddr::V6(ip6) => ip6.is_unspecified() && !self.ipv6only,
        }
    }

    #[inline]
    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    #[inline]
    pub fn instance(&self) -> usize {
        self.instance
    }

    #[inline]
    pub fn set_socket_address(&mut self, addr: SocketAddr) {
        self.address = addr;
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.address.set_port(port);
    }

    #[inline]
    pub fn set_ipv6_only(&mut self, ipv6only: bool) {
        self.ipv6only = ipv6only;
    }

    pub fn set_backlog(&mut self, backlog: u32) {
        if backlog >= MINIMAL_LISTEN_BACKLOG {
            self.backlog = backlog;
        }
    }

    pub fn set_instance(&mut self, instance: usize) {
        self.instance = instance.max(1);
    }
}
