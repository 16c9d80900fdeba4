/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod error;
pub(crate) use error::ServerTaskError;

mod stats;
pub use stats::{ServerStats, ServerStatsSnapshot};

mod handshake;
mod session;

mod server;
pub use server::{GatewayServer, ServerContext};
