/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::HttpLineParseError;

/// `<method> <target> HTTP/<version>`, with any amount of whitespace between the fields.
pub struct HttpMethodLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

impl<'a> HttpMethodLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpMethodLine<'a>, HttpLineParseError> {
        let line = std::str::from_utf8(buf)?;
        let mut fields = line.split_ascii_whitespace();

        let Some(method) = fields.next() else {
            return Err(HttpLineParseError::InvalidMethod);
        };
        let Some(target) = fields.next() else {
            return Err(HttpLineParseError::InvalidTarget);
        };
        let Some(version) = fields.next() else {
            return Err(HttpLineParseError::InvalidVersion);
        };
        if fields.next().is_some() {
            return Err(HttpLineParseError::TrailingField);
        }

        let version = match version.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("HTTP/") => &version[5..],
            _ => return Err(HttpLineParseError::InvalidVersion),
        };
        if version.is_empty() || !version.bytes().all(|c| c.is_ascii_digit() || c == b'.') {
            return Err(HttpLineParseError::InvalidVersion);
        }

        Ok(HttpMethodLine {
            method,
            target,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let l = HttpMethodLine::parse(b"CONNECT example.com:443 HTTP/1.1\r\n").unwrap();
        assert_eq!(l.method, "CONNECT");
        assert_eq!(l.target, "example.com:443");
        assert_eq!(l.version, "1.1");

        let l = HttpMethodLine::parse(b"connect\t[::1]:22   http/1.0\n").unwrap();
        assert_eq!(l.method, "connect");
        assert_eq!(l.target, "[::1]:22");
        assert_eq!(l.version, "1.0");
    }

    #[test]
    fn invalid() {
        assert!(HttpMethodLine::parse(b"\r\n").is_err());
        assert!(HttpMethodLine::parse(b"CONNECT example.com\r\n").is_err());
        assert!(HttpMethodLine::parse(b"CONNECT example.com FTP/1.1\r\n").is_err());
        assert!(HttpMethodLine::parse(b"CONNECT example.com HTTP/\r\n").is_err());
        assert!(HttpMethodLine::parse(b"CONNECT example.com HTTP/1.x\r\n").is_err());
        assert!(HttpMethodLine::parse(b"CONNECT a b HTTP/1.1\r\n").is_err());
    }
}
