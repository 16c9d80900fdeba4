/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use gw_dpi::{
    InspectVerdict, MaybeProtocol, Protocol, ProtocolInspectError, ProtocolInspectionConfig,
    ProtocolInspector,
};

fn check_client(data: &[u8]) -> Result<Protocol, ProtocolInspectError> {
    let mut inspector = ProtocolInspector::default();
    let config = ProtocolInspectionConfig::default();
    inspector.check_client_initial_data(&config, data)
}

#[test]
fn valid_connect() {
    const DATA: &[u8] = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com\r\n\r\n";

    let mut inspector = ProtocolInspector::default();
    let config = ProtocolInspectionConfig::default();
    let protocol = inspector.check_client_initial_data(&config, DATA).unwrap();
    assert_eq!(protocol, Protocol::HttpConnect);

    let req = inspector.take_http_connect_request().unwrap();
    assert_eq!(req.upstream().to_string(), "example.com:443");
    assert_eq!(req.header("host"), Some("example.com"));
    assert_eq!(req.head_len(), DATA.len());
    assert!(inspector.take_http_connect_request().is_none());
}

#[test]
fn lower_case_method() {
    const DATA: &[u8] = b"connect 127.0.0.1:8080 HTTP/1.0\n\n";
    assert_eq!(check_client(DATA).unwrap(), Protocol::HttpConnect);
}

#[test]
fn pipelined_data_kept() {
    const DATA: &[u8] = b"CONNECT a.example:22 HTTP/1.1\r\n\r\nSSH-2.0-x\r\n";
    let mut inspector = ProtocolInspector::default();
    let config = ProtocolInspectionConfig::default();
    let protocol = inspector.check_client_initial_data(&config, DATA).unwrap();
    assert_eq!(protocol, Protocol::HttpConnect);
    let req = inspector.take_http_connect_request().unwrap();
    assert_eq!(&DATA[req.head_len()..], b"SSH-2.0-x\r\n");
}

#[test]
fn insufficient_data() {
    assert_eq!(
        check_client(b"CONN"),
        Err(ProtocolInspectError::NeedMoreData(3))
    );
    assert_eq!(
        check_client(b"CONNECT example.com:443 HTTP/1.1\r\nHost: x\r\n"),
        Err(ProtocolInspectError::NeedMoreData(1))
    );
}

#[test]
fn other_method() {
    assert_eq!(
        check_client(b"GET / HTTP/1.1\r\n\r\n").unwrap(),
        Protocol::Unknown
    );
    assert_eq!(check_client(b"CONNEX").unwrap(), Protocol::Unknown);
}

#[test]
fn malformed_request_line() {
    assert_eq!(
        check_client(b"CONNECT example.com:443\r\n\r\n").unwrap(),
        Protocol::Unknown
    );
    assert_eq!(
        check_client(b"CONNECT example.com:99999 HTTP/1.1\r\n\r\n").unwrap(),
        Protocol::Unknown
    );
    assert_eq!(
        check_client(b"CONNECTION example.com HTTP/1.1\r\n\r\n").unwrap(),
        Protocol::Unknown
    );
}

#[test]
fn header_bound() {
    let mut config = ProtocolInspectionConfig::default();
    config.size_limit_mut().set_http_connect_header(1024);

    let mut data = b"CONNECT example.com:443 HTTP/1.1\r\n".to_vec();
    let mut inspector = ProtocolInspector::default();
    let mut verdict = InspectVerdict::Uncertain;
    for _ in 0..100 {
        data.extend_from_slice(b"X-Padding: aaaaaaaaaaaaaaaaaaaa\r\n");
        verdict = inspector.classify(&config, &data);
        if verdict != InspectVerdict::Uncertain {
            break;
        }
    }
    assert_eq!(verdict, InspectVerdict::Failed);
    assert!(data.len() > 1024);
    assert!(data.len() < 1024 + 64);
    assert!(inspector.is_excluded(MaybeProtocol::Http));
}

#[test]
fn terminated_head_over_bound() {
    let mut config = ProtocolInspectionConfig::default();
    config.size_limit_mut().set_http_connect_header(64);

    let mut data = b"CONNECT example.com:443 HTTP/1.1\r\n".to_vec();
    data.extend_from_slice(b"Host: example.com\r\nUser-Agent: test\r\n\r\n");
    let mut inspector = ProtocolInspector::default();
    assert_eq!(inspector.classify(&config, &data), InspectVerdict::Failed);
}
