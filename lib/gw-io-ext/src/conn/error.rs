/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

/// Misuse of a [`Connection`](super::Connection), returned synchronously by the initiators.
///
/// Transport errors never show up here, they go to the error callback of each operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("connection closed")]
    Closed,
}

/// The error seen by a pending operation cancelled by `close()`.
pub(super) fn operation_aborted() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "operation aborted by close")
}
