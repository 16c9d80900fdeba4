/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bytes::{BufMut, Bytes, BytesMut};

/// Reply to a socks5 request, the codes are defined in rfc1928.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Socks5Reply {
    /// With the bound address of the outgoing connection.
    Succeeded(SocketAddr),
    GeneralServerFailure,
    ForbiddenByRule,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
}

impl Socks5Reply {
    pub const fn code(&self) -> u8 {
        match self {
            Socks5Reply::Succeeded(_) => 0x00,
            Socks5Reply::GeneralServerFailure => 0x01,
            Socks5Reply::ForbiddenByRule => 0x02,
            Socks5Reply::NetworkUnreachable => 0x03,
            Socks5Reply::HostUnreachable => 0x04,
            Socks5Reply::ConnectionRefused => 0x05,
            Socks5Reply::TtlExpired => 0x06,
            Socks5Reply::CommandNotSupported => 0x07,
            Socks5Reply::AddressTypeNotSupported => 0x08,
        }
    }

    fn bound_addr(&self) -> SocketAddr {
        match self {
            Socks5Reply::Succeeded(addr) => *addr,
            _ => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        }
    }

    /// `VER REP RSV ATYP BND.ADDR BND.PORT`
    ///
    /// The address type follows the real address family, so an ipv4-mapped ipv6 address
    /// is written as ipv4. Failures carry `0.0.0.0:0`.
    pub fn encode_to(&self, buf: &mut BytesMut) {
        let addr = self.bound_addr();
        buf.put_slice(&[0x05, self.code(), 0x00]);
        match addr.ip().to_canonical() {
            IpAddr::V4(ip4) => {
                buf.put_u8(0x01);
                buf.put_slice(&ip4.octets());
            }
            IpAddr::V6(ip6) => {
                buf.put_u8(0x04);
                buf.put_slice(&ip6.octets());
            }
        }
        buf.put_u16(addr.port());
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(22);
        self.encode_to(&mut buf);
        buf.freeze()
    }
}
