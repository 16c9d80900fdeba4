/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use bytes::Bytes;

use gw_http::{HttpConnectRequest, HttpConnectResponse};
use gw_io_ext::ByteBuffer;

use super::HandshakeAction;

enum HttpConnectState {
    Start,
    Connecting,
    Done,
}

/// The request head has already been parsed by the protocol inspector, and should have been
/// consumed from the session buffer.
pub(crate) struct HttpConnectHandshake {
    request: HttpConnectRequest,
    failure_reply: bool,
    state: HttpConnectState,
}

impl HttpConnectHandshake {
    pub(crate) fn new(request: HttpConnectRequest, failure_reply: bool) -> Self {
        HttpConnectHandshake {
            request,
            failure_reply,
            state: HttpConnectState::Start,
        }
    }

    pub(super) fn on_data(&mut self, _buf: &mut ByteBuffer) -> HandshakeAction {
        match self.state {
            HttpConnectState::Start => {
                self.state = HttpConnectState::Connecting;
                HandshakeAction::Connect(self.request.upstream().clone())
            }
            HttpConnectState::Connecting | HttpConnectState::Done => HandshakeAction::NeedMoreData,
        }
    }

    pub(super) fn on_connected(&mut self) -> Bytes {
        self.state = HttpConnectState::Done;
        Bytes::from_static(HttpConnectResponse::Established.as_bytes())
    }

    pub(super) fn on_connect_failed(&mut self) -> Option<Bytes> {
        self.state = HttpConnectState::Done;
        if self.failure_reply {
            Some(Bytes::from_static(HttpConnectResponse::BadGateway.as_bytes()))
        } else {
            None
        }
    }
}
