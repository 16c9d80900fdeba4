/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
mod daemon;

pub use config::{config_dir, config_file, validate_and_set_config_file};
pub use daemon::{DaemonArgs, DaemonArgsExt};
