/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use hex_literal::hex;

use gw_socks::v5::Socks5Reply;

#[test]
fn succeeded_ipv4() {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), 40000);
    let data = Socks5Reply::Succeeded(addr).encode();
    assert_eq!(data.as_ref(), hex!("05 00 00 01 0a 00 00 02 9c 40"));
}

#[test]
fn succeeded_ipv6() {
    let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 443);
    let data = Socks5Reply::Succeeded(addr).encode();
    assert_eq!(
        data.as_ref(),
        hex!("05 00 00 04 00000000000000000000000000000001 01 bb")
    );
}

#[test]
fn succeeded_ipv4_mapped() {
    let ip = Ipv4Addr::new(192, 168, 1, 1).to_ipv6_mapped();
    let addr = SocketAddr::new(IpAddr::V6(ip), 8080);
    let data = Socks5Reply::Succeeded(addr).encode();
    assert_eq!(data.as_ref(), hex!("05 00 00 01 c0 a8 01 01 1f 90"));
}

#[test]
fn failures() {
    assert_eq!(
        Socks5Reply::GeneralServerFailure.encode().as_ref(),
        hex!("05 01 00 01 00000000 0000")
    );
    assert_eq!(
        Socks5Reply::CommandNotSupported.encode().as_ref(),
        hex!("05 07 00 01 00000000 0000")
    );
    assert_eq!(
        Socks5Reply::AddressTypeNotSupported.encode().as_ref(),
        hex!("05 08 00 01 00000000 0000")
    );
}
