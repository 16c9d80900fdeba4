/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use bytes::Bytes;

use gw_dpi::Protocol;
use gw_io_ext::ByteBuffer;
use gw_types::net::UpstreamAddr;

mod http_connect;
pub(crate) use http_connect::HttpConnectHandshake;

mod socks5_connect;
pub(crate) use socks5_connect::Socks5ConnectHandshake;

/// What the session should do after feeding data to a handshake.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HandshakeAction {
    /// Wait for more client data.
    NeedMoreData,
    /// Send the bytes to the client, then feed the handshake again.
    Reply(Bytes),
    /// Resolve and connect to the upstream, then call `on_connected` or `on_connect_failed`.
    Connect(UpstreamAddr),
    /// Send the optional reply to the client, then close it.
    Fail {
        reply: Option<Bytes>,
        reason: &'static str,
    },
}

pub(crate) enum Handshake {
    HttpConnect(HttpConnectHandshake),
    Socks5Connect(Socks5ConnectHandshake),
}

impl Handshake {
    pub(crate) fn protocol(&self) -> Protocol {
        match self {
            Handshake::HttpConnect(_) => Protocol::HttpConnect,
            Handshake::Socks5Connect(_) => Protocol::Socks5,
        }
    }

    /// Consume the handshake bytes at the start of `buf`.
    ///
    /// Bytes after the handshake are left in `buf`, and should be sent to the upstream once
    /// connected.
    pub(crate) fn on_data(&mut self, buf: &mut ByteBuffer) -> HandshakeAction {
        match self {
            Handshake::HttpConnect(h) => h.on_data(buf),
            Handshake::Socks5Connect(h) => h.on_data(buf),
        }
    }

    /// The reply to send to the client before relaying.
    pub(crate) fn on_connected(&mut self, local_addr: SocketAddr) -> Bytes {
        match self {
            Handshake::HttpConnect(h) => h.on_connected(),
            Handshake::Socks5Connect(h) => h.on_connected(local_addr),
        }
    }

    pub(crate) fn on_connect_failed(&mut self) -> Option<Bytes> {
        match self {
            Handshake::HttpConnect(h) => h.on_connect_failed(),
            Handshake::Socks5Connect(h) => h.on_connect_failed(),
        }
    }
}
