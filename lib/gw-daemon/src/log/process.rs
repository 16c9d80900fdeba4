/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use slog::{Drain, slog_o};
use slog_scope::GlobalLoggerGuard;

use gw_types::log::AsyncLogConfig;

use crate::opts::DaemonArgs;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

/// Install the process wide logger, all `log` macros will go to stderr after this.
///
/// The returned guard should be kept alive until the process exits.
pub fn setup(args: &DaemonArgs) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let async_conf = AsyncLogConfig::with_name(PROCESS_LOG_THREAD_NAME);
    let drain = gw_stdlog::new_async_logger(&async_conf, args.verbose_level > 2);
    let logger = slog::Logger::root(drain.fuse(), slog_o!("daemon" => args.process_name));

    let scope_guard = slog_scope::set_global_logger(logger);

    slog_stdlog::init_with_level(log_level(args.verbose_level))?;
    Ok(scope_guard)
}

fn log_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}
