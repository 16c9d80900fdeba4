/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use gw_types::net::UpstreamAddr;

use crate::{Socks5DecodeError, SocksCommand, SocksNegotiationError};

const HEADER_LEN: usize = 4;

/// `VER CMD RSV ATYP DST.ADDR DST.PORT`
#[derive(Debug)]
pub struct Socks5Request {
    pub command: SocksCommand,
    pub upstream: UpstreamAddr,
}

impl Socks5Request {
    /// Decode a request at the start of `data`, returning it with the number of bytes used.
    ///
    /// Bytes after the request are left untouched, they may be pipelined application data.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), Socks5DecodeError> {
        if data.is_empty() {
            return Err(Socks5DecodeError::NeedMoreData(HEADER_LEN));
        }
        if data[0] != 0x05 {
            return Err(SocksNegotiationError::InvalidVersion.into());
        }
        if data.len() < HEADER_LEN {
            return Err(Socks5DecodeError::NeedMoreData(HEADER_LEN - data.len()));
        }

        let command = SocksCommand::try_from(data[1])?;
        let _rsv = data[2];

        let left = &data[HEADER_LEN..];
        let (upstream, addr_len) = match data[3] {
            0x01 => {
                let need = 4 + 2;
                if left.len() < need {
                    return Err(Socks5DecodeError::NeedMoreData(need - left.len()));
                }
                let ip_bytes: [u8; 4] = [left[0], left[1], left[2], left[3]];
                let port = u16::from_be_bytes([left[4], left[5]]);
                let ip = IpAddr::V4(Ipv4Addr::from(ip_bytes));
                (UpstreamAddr::from_ip_and_port(ip, port), need)
            }
            0x03 => {
                if left.is_empty() {
                    return Err(Socks5DecodeError::NeedMoreData(1));
                }
                let len = left[0] as usize;
                if len == 0 {
                    return Err(SocksNegotiationError::InvalidDomainString.into());
                }
                let need = 1 + len + 2;
                if left.len() < need {
                    return Err(Socks5DecodeError::NeedMoreData(need - left.len()));
                }
                let domain = std::str::from_utf8(&left[1..1 + len])
                    .map_err(|_| SocksNegotiationError::InvalidDomainString)?;
                let port = u16::from_be_bytes([left[1 + len], left[2 + len]]);
                let upstream = UpstreamAddr::from_host_str_and_port(domain, port)
                    .map_err(|_| SocksNegotiationError::InvalidDomainString)?;
                (upstream, need)
            }
            0x04 => {
                let need = 16 + 2;
                if left.len() < need {
                    return Err(Socks5DecodeError::NeedMoreData(need - left.len()));
                }
                let mut ip_bytes = [0u8; 16];
                ip_bytes.copy_from_slice(&left[0..16]);
                let port = u16::from_be_bytes([left[16], left[17]]);
                let ip = IpAddr::V6(Ipv6Addr::from(ip_bytes));
                (UpstreamAddr::from_ip_and_port(ip, port), need)
            }
            _ => return Err(SocksNegotiationError::InvalidAddrType.into()),
        };

        Ok((Socks5Request { command, upstream }, HEADER_LEN + addr_len))
    }
}
