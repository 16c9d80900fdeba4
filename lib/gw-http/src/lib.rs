/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod parse;
pub use parse::{HttpHeaderLine, HttpLineParseError, HttpMethodLine};

mod connect;
pub use connect::{HttpConnectParseError, HttpConnectRequest, HttpConnectResponse};
