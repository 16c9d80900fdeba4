/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// Operation counter value after the close callback has been armed.
pub(super) const OPERATIONS_CLOSED: isize = isize::MIN;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionRole {
    Listener,
    ServerSideAccepted,
    ClientSideOutbound,
}

impl ConnectionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionRole::Listener => "Listener",
            ConnectionRole::ServerSideAccepted => "ServerSideAccepted",
            ConnectionRole::ClientSideOutbound => "ClientSideOutbound",
        }
    }
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The numeric order is the only allowed transition order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum ConnectionState {
    NotAttempted = 0,
    Failed = 1,
    Successful = 2,
    ClosePending = 3,
    Closed = 4,
}

impl ConnectionState {
    pub(super) fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectionState::NotAttempted,
            1 => ConnectionState::Failed,
            2 => ConnectionState::Successful,
            3 => ConnectionState::ClosePending,
            _ => ConnectionState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::NotAttempted => "NotAttempted",
            ConnectionState::Failed => "Failed",
            ConnectionState::Successful => "Successful",
            ConnectionState::ClosePending => "ClosePending",
            ConnectionState::Closed => "Closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order() {
        assert!(ConnectionState::NotAttempted < ConnectionState::Failed);
        assert!(ConnectionState::Successful < ConnectionState::ClosePending);
        assert!(ConnectionState::ClosePending < ConnectionState::Closed);
        for s in [
            ConnectionState::NotAttempted,
            ConnectionState::Failed,
            ConnectionState::Successful,
            ConnectionState::ClosePending,
            ConnectionState::Closed,
        ] {
            assert_eq!(ConnectionState::from_u8(s as u8), s);
        }
    }
}
