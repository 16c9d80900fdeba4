/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Socks5 method codes offered in the greeting, see RFC 1928 section 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocksAuthMethod {
    None,
    GssApi,
    User,
    /// IANA assigned or private methods, never selected by us
    Other(u8),
    NoAcceptable,
}

impl SocksAuthMethod {
    pub const fn code(&self) -> u8 {
        match self {
            SocksAuthMethod::None => 0x00,
            SocksAuthMethod::GssApi => 0x01,
            SocksAuthMethod::User => 0x02,
            SocksAuthMethod::Other(v) => *v,
            SocksAuthMethod::NoAcceptable => 0xFF,
        }
    }
}

impl From<u8> for SocksAuthMethod {
    fn from(method: u8) -> Self {
        match method {
            0x00 => SocksAuthMethod::None,
            0x01 => SocksAuthMethod::GssApi,
            0x02 => SocksAuthMethod::User,
            0xFF => SocksAuthMethod::NoAcceptable,
            v => SocksAuthMethod::Other(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code() {
        for v in [0x00u8, 0x01, 0x02, 0x03, 0x80, 0xFF] {
            assert_eq!(SocksAuthMethod::from(v).code(), v);
        }
        assert_eq!(SocksAuthMethod::from(0x03), SocksAuthMethod::Other(0x03));
    }
}
