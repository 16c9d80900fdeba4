/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

mod inspect;
use inspect::ProtocolInspectState;
pub use inspect::{InspectVerdict, ProtocolInspectError, ProtocolInspector};

mod http;
mod socks;

/// Candidate proxy protocols, the order here is not the check order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(usize)]
pub enum MaybeProtocol {
    Http,
    Socks,

    _MaxSize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Protocol {
    Unknown,
    HttpConnect,
    Socks5,
}

impl Protocol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Unknown => "unknown",
            Protocol::HttpConnect => "http_connect",
            Protocol::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
