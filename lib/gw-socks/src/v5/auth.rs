/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use smallvec::SmallVec;

use crate::{Socks5DecodeError, SocksAuthMethod, SocksNegotiationError};

/// The client greeting: `VER NMETHODS METHODS...`
#[derive(Debug)]
pub struct Socks5Greeting {
    methods: SmallVec<[SocksAuthMethod; 4]>,
}

impl Socks5Greeting {
    /// Decode the greeting at the start of `data`, returning it with the number of bytes used.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), Socks5DecodeError> {
        if data.len() < 2 {
            return Err(Socks5DecodeError::NeedMoreData(2 - data.len()));
        }
        if data[0] != 0x05 {
            return Err(SocksNegotiationError::InvalidVersion.into());
        }
        // an empty method list is still a greeting, it just offers nothing acceptable
        let method_count = data[1] as usize;
        let total = 2 + method_count;
        if data.len() < total {
            return Err(Socks5DecodeError::NeedMoreData(total - data.len()));
        }

        let methods = data[2..total]
            .iter()
            .map(|v| SocksAuthMethod::from(*v))
            .collect();
        Ok((Socks5Greeting { methods }, total))
    }

    pub fn methods(&self) -> &[SocksAuthMethod] {
        &self.methods
    }

    pub fn offers(&self, method: SocksAuthMethod) -> bool {
        self.methods.contains(&method)
    }
}

/// The server reply to the greeting: `VER METHOD`
pub struct Socks5MethodSelection;

impl Socks5MethodSelection {
    pub const fn encode(method: SocksAuthMethod) -> [u8; 2] {
        [0x05, method.code()]
    }
}
