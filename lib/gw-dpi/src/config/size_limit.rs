/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

const DEFAULT_HTTP_CONNECT_HEADER_SIZE: usize = 256 * 1024;
const MINIMAL_HTTP_CONNECT_HEADER_SIZE: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolInspectionSizeLimit {
    pub(crate) http_connect_header: usize,
}

impl Default for ProtocolInspectionSizeLimit {
    fn default() -> Self {
        ProtocolInspectionSizeLimit {
            http_connect_header: DEFAULT_HTTP_CONNECT_HEADER_SIZE,
        }
    }
}

impl ProtocolInspectionSizeLimit {
    pub fn set_http_connect_header(&mut self, size: usize) {
        self.http_connect_header = size.max(MINIMAL_HTTP_CONNECT_HEADER_SIZE);
    }

    #[inline]
    pub fn http_connect_header(&self) -> usize {
        self.http_connect_header
    }
}
