/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Fixed responses sent back to a `CONNECT` client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HttpConnectResponse {
    Established,
    BadGateway,
}

impl HttpConnectResponse {
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            HttpConnectResponse::Established => b"HTTP/1.1 200 OK\r\n\r\n",
            HttpConnectResponse::BadGateway => {
                b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            }
        }
    }
}
