/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use gw_http::HttpConnectRequest;

use super::{MaybeProtocol, Protocol, ProtocolInspectError, ProtocolInspectState};
use crate::ProtocolInspectionSizeLimit;

const CONNECT_METHOD: &[u8] = b"CONNECT";

impl ProtocolInspectState {
    pub(crate) fn check_http_connect_request(
        &mut self,
        data: &[u8],
        size_limit: &ProtocolInspectionSizeLimit,
    ) -> Result<Option<Protocol>, ProtocolInspectError> {
        let data_len = data.len();
        let method_len = CONNECT_METHOD.len();

        let check_len = data_len.min(method_len);
        if !data[..check_len].eq_ignore_ascii_case(&CONNECT_METHOD[..check_len]) {
            self.exclude_current();
            return Ok(None);
        }
        if data_len < method_len {
            return Err(ProtocolInspectError::NeedMoreData(method_len - data_len));
        }

        // exclude impossible protocols
        self.exclude_other(MaybeProtocol::Socks);

        let max_header_size = size_limit.http_connect_header();
        let scan_start = self.http_scan_offset.max(method_len);
        let Some(head_len) = find_head_end(data, scan_start) else {
            if data_len > max_header_size {
                self.exclude_current();
                return Ok(None);
            }
            self.http_scan_offset = data_len;
            return Err(ProtocolInspectError::NeedMoreData(1));
        };
        if head_len > max_header_size {
            self.exclude_current();
            return Ok(None);
        }

        match HttpConnectRequest::parse(&data[..head_len]) {
            Ok(req) => {
                self.http_connect_request = Some(req);
                Ok(Some(Protocol::HttpConnect))
            }
            Err(_) => {
                self.exclude_current();
                Ok(None)
            }
        }
    }
}

/// Find the end of the request head, which is the position after the empty line.
///
/// Both `\n\n` and `\r\n\r\n` endings are accepted, and `offset` should be the position
/// from which no `\n` has been checked yet.
fn find_head_end(data: &[u8], offset: usize) -> Option<usize> {
    for pos in memchr::memchr_iter(b'\n', &data[offset..]) {
        let i = offset + pos;
        match data[i - 1] {
            b'\n' => return Some(i + 1),
            b'\r' if data[i - 2] == b'\n' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_end() {
        assert_eq!(find_head_end(b"CONNECT a\n\n", 7), Some(11));
        assert_eq!(find_head_end(b"CONNECT a\r\n\r\nxx", 7), Some(13));
        assert_eq!(find_head_end(b"CONNECT a\r\nb: c\r\n", 7), None);
        assert_eq!(find_head_end(b"CONNECT a\r\n\rx\n", 7), None);
    }

    #[test]
    fn resume_scan() {
        let size_limit = ProtocolInspectionSizeLimit::default();
        let mut state = ProtocolInspectState::default();

        let data = b"CONNECT example.net:443 HTTP/1.1\r\n\r\n";
        let r = state.check_http_connect_request(&data[..33], &size_limit);
        assert_eq!(r, Err(ProtocolInspectError::NeedMoreData(1)));
        assert_eq!(state.http_scan_offset, 33);

        let r = state.check_http_connect_request(data, &size_limit).unwrap();
        assert_eq!(r, Some(Protocol::HttpConnect));
        let req = state.http_connect_request.take().unwrap();
        assert_eq!(req.upstream().port(), 443);
        assert_eq!(req.head_len(), data.len());
    }
}
