/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::HttpLineParseError;

pub struct HttpHeaderLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> HttpHeaderLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpHeaderLine<'a>, HttpLineParseError> {
        let line = std::str::from_utf8(buf)?;
        let Some(p) = memchr::memchr(b':', line.as_bytes()) else {
            return Err(HttpLineParseError::NoDelimiterFound(':'));
        };

        let name = line[0..p].trim();
        let value = line[p + 1..].trim();

        Ok(HttpHeaderLine { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let h = HttpHeaderLine::parse(b"Host: example.com:443\r\n").unwrap();
        assert_eq!(h.name, "Host");
        assert_eq!(h.value, "example.com:443");

        let h = HttpHeaderLine::parse(b"  Proxy-Connection :keep-alive\n").unwrap();
        assert_eq!(h.name, "Proxy-Connection");
        assert_eq!(h.value, "keep-alive");
    }

    #[test]
    fn empty_value() {
        let h = HttpHeaderLine::parse(b"X-Empty:\r\n").unwrap();
        assert_eq!(h.name, "X-Empty");
        assert_eq!(h.value, "");
    }

    #[test]
    fn no_colon() {
        assert_eq!(
            HttpHeaderLine::parse(b"garbage line\r\n").err(),
            Some(HttpLineParseError::NoDelimiterFound(':'))
        );
    }
}
