/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod async_log;
mod stats;

pub use async_log::{AsyncLogConfig, AsyncLogFormatter, AsyncLogger};
pub use stats::{LogDropReason, LogSnapshot, LogStats};
