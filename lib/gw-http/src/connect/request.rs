/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use ahash::AHashMap;

use gw_types::net::UpstreamAddr;

use super::HttpConnectParseError;
use crate::{HttpHeaderLine, HttpMethodLine};

const DEFAULT_CONNECT_PORT: u16 = 80;

/// A parsed `CONNECT` request head.
#[derive(Debug)]
pub struct HttpConnectRequest {
    upstream: UpstreamAddr,
    version: String,
    headers: AHashMap<String, String>,
    head_len: usize,
}

impl HttpConnectRequest {
    /// Parse a complete request head, which should end with an empty line.
    ///
    /// Header lines without a colon are skipped. Header names are matched case
    /// insensitively, and the last one wins if a header shows up more than once.
    pub fn parse(head: &[u8]) -> Result<Self, HttpConnectParseError> {
        let mut lines = head.split_inclusive(|c| *c == b'\n');

        let Some(first) = lines.next() else {
            return Err(HttpConnectParseError::IncompleteHead);
        };
        let method_line = HttpMethodLine::parse(first)?;
        if !method_line.method.eq_ignore_ascii_case("CONNECT") {
            return Err(HttpConnectParseError::UnsupportedMethod(
                method_line.method.to_string(),
            ));
        }
        let upstream =
            UpstreamAddr::parse_with_default_port(method_line.target, DEFAULT_CONNECT_PORT)
                .map_err(|e| {
                    HttpConnectParseError::InvalidUpstream(
                        method_line.target.to_string(),
                        e.to_string(),
                    )
                })?;

        let mut headers = AHashMap::new();
        let mut end_found = false;
        for line in lines {
            if line == b"\n" || line == b"\r\n" {
                end_found = true;
                break;
            }
            if let Ok(header) = HttpHeaderLine::parse(line) {
                headers.insert(header.name.to_lowercase(), header.value.to_string());
            }
        }
        if !end_found {
            return Err(HttpConnectParseError::IncompleteHead);
        }

        Ok(HttpConnectRequest {
            upstream,
            version: method_line.version.to_string(),
            headers,
            head_len: head.len(),
        })
    }

    #[inline]
    pub fn upstream(&self) -> &UpstreamAddr {
        &self.upstream
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    #[inline]
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Size of the request head, bytes after it belong to the tunnel.
    #[inline]
    pub fn head_len(&self) -> usize {
        self.head_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_types::net::Host;

    #[test]
    fn normal() {
        let head = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\nUser-Agent: curl/8.0\r\n\r\n";
        let req = HttpConnectRequest::parse(head).unwrap();
        assert_eq!(req.upstream().host(), &Host::Domain("example.com".to_string()));
        assert_eq!(req.upstream().port(), 443);
        assert_eq!(req.version(), "1.1");
        assert_eq!(req.header("host"), Some("example.com:443"));
        assert_eq!(req.header("USER-AGENT"), Some("curl/8.0"));
        assert_eq!(req.header_count(), 2);
        assert_eq!(req.head_len(), head.len());
    }

    #[test]
    fn lf_only() {
        let req = HttpConnectRequest::parse(b"connect 10.0.0.1 HTTP/1.0\n\n").unwrap();
        assert_eq!(req.upstream().port(), 80);
        assert_eq!(req.upstream().to_string(), "10.0.0.1:80");
        assert_eq!(req.header_count(), 0);
    }

    #[test]
    fn duplicate_header() {
        let head = b"CONNECT [::1]:22 HTTP/1.1\r\nX-Trace: a\r\nbad line\r\nx-trace: b\r\n\r\n";
        let req = HttpConnectRequest::parse(head).unwrap();
        assert_eq!(req.header("X-Trace"), Some("b"));
        assert_eq!(req.header_count(), 1);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            HttpConnectRequest::parse(b"GET / HTTP/1.1\r\n\r\n"),
            Err(HttpConnectParseError::UnsupportedMethod(_))
        ));
        assert!(matches!(
            HttpConnectRequest::parse(b"CONNECT example.com:0 HTTP/1.1\r\n\r\n"),
            Err(HttpConnectParseError::InvalidUpstream(_, _))
        ));
        assert!(matches!(
            HttpConnectRequest::parse(b"CONNECT HTTP/1.1\r\n\r\n"),
            Err(HttpConnectParseError::InvalidRequestLine(_))
        ));
        assert!(matches!(
            HttpConnectRequest::parse(b"CONNECT example.com:443 HTTP/1.1\r\nHost: a\r\n"),
            Err(HttpConnectParseError::IncompleteHead)
        ));
    }
}
