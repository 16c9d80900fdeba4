/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::{MaybeProtocol, Protocol, ProtocolInspectError, ProtocolInspectState};

impl ProtocolInspectState {
    pub(crate) fn check_socks_client_greeting(
        &mut self,
        data: &[u8],
    ) -> Result<Option<Protocol>, ProtocolInspectError> {
        // VER NMETHODS
        const MINIMUM_DATA_LEN: usize = 2;

        let data_len = data.len();
        if data_len == 0 {
            return Err(ProtocolInspectError::NeedMoreData(MINIMUM_DATA_LEN));
        }

        match data[0] {
            0x05 => {}
            // socks4 is not supported
            _ => {
                self.exclude_current();
                return Ok(None);
            }
        }

        // exclude impossible protocols
        self.exclude_other(MaybeProtocol::Http);

        if data_len < MINIMUM_DATA_LEN {
            return Err(ProtocolInspectError::NeedMoreData(MINIMUM_DATA_LEN - data_len));
        }

        let greeting_len = MINIMUM_DATA_LEN + data[1] as usize;
        if data_len < greeting_len {
            return Err(ProtocolInspectError::NeedMoreData(greeting_len - data_len));
        }

        Ok(Some(Protocol::Socks5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_methods() {
        let mut state = ProtocolInspectState::default();
        let r = state.check_socks_client_greeting(&[0x05, 0x00]).unwrap();
        assert_eq!(r, Some(Protocol::Socks5));
    }

    #[test]
    fn socks4() {
        let mut state = ProtocolInspectState::default();
        let r = state.check_socks_client_greeting(&[0x04, 0x01]).unwrap();
        assert_eq!(r, None);
    }
}
