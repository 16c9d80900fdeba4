/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use gw_io_ext::ConnectionError;
use gw_resolver::ResolveError;

#[derive(Error, Debug)]
pub(crate) enum ServerTaskError {
    #[error("unknown client protocol")]
    UnknownProtocol,
    #[error("invalid client protocol: {0}")]
    InvalidClientProtocol(&'static str),
    #[error("client handshake timeout")]
    HandshakeTimeout,
    #[error("too much early data before the upstream is connected")]
    EarlyDataOverflow,
    #[error("upstream not resolved: {0}")]
    UpstreamNotResolved(ResolveError),
    #[error("upstream not connected: {0:?}")]
    UpstreamNotConnected(io::Error),
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
}
