/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use crate::HttpLineParseError;

#[derive(Debug, Error)]
pub enum HttpConnectParseError {
    #[error("no header end found")]
    IncompleteHead,
    #[error("invalid request line: {0}")]
    InvalidRequestLine(#[from] HttpLineParseError),
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),
    #[error("invalid upstream address {0}: {1}")]
    InvalidUpstream(String, String),
}
