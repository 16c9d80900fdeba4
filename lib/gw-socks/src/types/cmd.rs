/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::SocksNegotiationError;

/// The CMD field of a socks5 request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocksCommand {
    TcpConnect = 0x01,
    TcpBind = 0x02,
    UdpAssociate = 0x03,
}

impl TryFrom<u8> for SocksCommand {
    type Error = SocksNegotiationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let cmd = match value {
            0x01 => SocksCommand::TcpConnect,
            0x02 => SocksCommand::TcpBind,
            0x03 => SocksCommand::UdpAssociate,
            _ => return Err(SocksNegotiationError::InvalidCommand),
        };
        Ok(cmd)
    }
}
