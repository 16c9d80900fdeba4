/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

/// The message is complete but not acceptable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksNegotiationError {
    #[error("not a socks5 message")]
    InvalidVersion,
    #[error("unknown command")]
    InvalidCommand,
    #[error("malformed domain name")]
    InvalidDomainString,
    #[error("unknown address type")]
    InvalidAddrType,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks5DecodeError {
    #[error("incomplete message, {0} more bytes needed")]
    NeedMoreData(usize),
    #[error("invalid socks5 message: {0}")]
    InvalidProtocol(#[from] SocksNegotiationError),
}
