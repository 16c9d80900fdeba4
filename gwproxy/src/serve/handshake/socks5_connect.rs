/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use bytes::Bytes;

use gw_io_ext::ByteBuffer;
use gw_socks::v5::{Socks5Greeting, Socks5MethodSelection, Socks5Reply, Socks5Request};
use gw_socks::{Socks5DecodeError, SocksAuthMethod, SocksCommand, SocksNegotiationError};

use super::HandshakeAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Socks5State {
    Greeting,
    Request,
    Connecting,
    Done,
}

/// Server side of a socks5 `CONNECT` negotiation, only the no-auth method is accepted.
pub(crate) struct Socks5ConnectHandshake {
    state: Socks5State,
}

impl Socks5ConnectHandshake {
    pub(crate) fn new() -> Self {
        Socks5ConnectHandshake {
            state: Socks5State::Greeting,
        }
    }

    pub(super) fn on_data(&mut self, buf: &mut ByteBuffer) -> HandshakeAction {
        match self.state {
            Socks5State::Greeting => self.recv_greeting(buf),
            Socks5State::Request => self.recv_request(buf),
            Socks5State::Connecting | Socks5State::Done => HandshakeAction::NeedMoreData,
        }
    }

    fn recv_greeting(&mut self, buf: &mut ByteBuffer) -> HandshakeAction {
        let (greeting, len) = match Socks5Greeting::decode(buf.as_slice()) {
            Ok(v) => v,
            Err(Socks5DecodeError::NeedMoreData(_)) => return HandshakeAction::NeedMoreData,
            Err(Socks5DecodeError::InvalidProtocol(_)) => {
                return HandshakeAction::Fail {
                    reply: None,
                    reason: "invalid socks5 greeting",
                };
            }
        };
        buf.consume(len);

        if greeting.offers(SocksAuthMethod::None) {
            self.state = Socks5State::Request;
            HandshakeAction::Reply(Bytes::from_static(&NO_AUTH_SELECTION))
        } else {
            self.state = Socks5State::Done;
            HandshakeAction::Fail {
                reply: Some(Bytes::from_static(&NO_ACCEPTABLE_SELECTION)),
                reason: "no acceptable socks5 auth method",
            }
        }
    }

    fn recv_request(&mut self, buf: &mut ByteBuffer) -> HandshakeAction {
        let (req, len) = match Socks5Request::decode(buf.as_slice()) {
            Ok(v) => v,
            Err(Socks5DecodeError::NeedMoreData(_)) => return HandshakeAction::NeedMoreData,
            Err(Socks5DecodeError::InvalidProtocol(e)) => {
                self.state = Socks5State::Done;
                let reply = match e {
                    SocksNegotiationError::InvalidVersion => None,
                    SocksNegotiationError::InvalidCommand => {
                        Some(Socks5Reply::CommandNotSupported.encode())
                    }
                    SocksNegotiationError::InvalidAddrType => {
                        Some(Socks5Reply::AddressTypeNotSupported.encode())
                    }
                    SocksNegotiationError::InvalidDomainString => {
                        Some(Socks5Reply::GeneralServerFailure.encode())
                    }
                };
                return HandshakeAction::Fail {
                    reply,
                    reason: "invalid socks5 request",
                };
            }
        };
        buf.consume(len);

        if req.command != SocksCommand::TcpConnect {
            self.state = Socks5State::Done;
            return HandshakeAction::Fail {
                reply: Some(Socks5Reply::CommandNotSupported.encode()),
                reason: "unsupported socks5 command",
            };
        }
        self.state = Socks5State::Connecting;
        HandshakeAction::Connect(req.upstream)
    }

    pub(super) fn on_connected(&mut self, local_addr: SocketAddr) -> Bytes {
        self.state = Socks5State::Done;
        Socks5Reply::Succeeded(local_addr).encode()
    }

    pub(super) fn on_connect_failed(&mut self) -> Option<Bytes> {
        self.state = Socks5State::Done;
        Some(Socks5Reply::GeneralServerFailure.encode())
    }
}

const NO_AUTH_SELECTION: [u8; 2] = Socks5MethodSelection::encode(SocksAuthMethod::None);
const NO_ACCEPTABLE_SELECTION: [u8; 2] =
    Socks5MethodSelection::encode(SocksAuthMethod::NoAcceptable);
