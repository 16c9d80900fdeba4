/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use flume::{Sender, TrySendError};
use slog::{Drain, OwnedKVList, Record};

use super::{LogDropReason, LogStats};

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct AsyncLogConfig {
    pub channel_capacity: usize,
    pub thread_name: String,
}

impl AsyncLogConfig {
    pub fn with_name(thread_name: &str) -> Self {
        AsyncLogConfig {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            thread_name: thread_name.to_string(),
        }
    }
}

impl Default for AsyncLogConfig {
    fn default() -> Self {
        AsyncLogConfig::with_name("log-async")
    }
}

/// Turn a slog record into the value sent to the io thread.
pub trait AsyncLogFormatter<T> {
    fn format_slog(&self, record: &Record, logger_values: &OwnedKVList) -> Result<T, slog::Error>;
}

/// A slog drain that never blocks the caller.
///
/// Records are formatted in place and then handed over through a bounded channel,
/// records are dropped (and counted) if the channel is full.
pub struct AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    sender: Sender<T>,
    formatter: F,
    stats: Arc<LogStats>,
}

impl<T, F> AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    pub fn new(sender: Sender<T>, formatter: F, stats: Arc<LogStats>) -> Self {
        AsyncLogger {
            sender,
            formatter,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

impl<T, F> Drain for AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        self.stats.add_total();

        let v = self
            .formatter
            .format_slog(record, logger_values)
            .inspect_err(|_| self.stats.add_dropped(LogDropReason::FormatFailed))?;
        match self.sender.try_send(v) {
            Ok(_) => {}
            Err(TrySendError::Full(_)) => self.stats.add_dropped(LogDropReason::ChannelOverflow),
            Err(TrySendError::Disconnected(_)) => self.stats.add_dropped(LogDropReason::ChannelClosed),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{Logger, o, info};

    struct MsgFormatter;

    impl AsyncLogFormatter<String> for MsgFormatter {
        fn format_slog(&self, record: &Record, _values: &OwnedKVList) -> Result<String, slog::Error> {
            Ok(record.msg().to_string())
        }
    }

    #[test]
    fn overflow() {
        let (sender, receiver) = flume::bounded::<String>(1);
        let stats = Arc::new(LogStats::default());
        let drain = AsyncLogger::new(sender, MsgFormatter, Arc::clone(&stats));
        let logger = Logger::root(drain.fuse(), o!());

        info!(logger, "first");
        info!(logger, "second");
        assert_eq!(receiver.try_recv().unwrap(), "first");

        let snap = stats.snapshot();
        assert_eq!(snap.total, 2);
        assert_eq!(snap.dropped_by(LogDropReason::ChannelOverflow), 1);
    }

    #[test]
    fn closed() {
        let (sender, receiver) = flume::bounded::<String>(4);
        drop(receiver);
        let stats = Arc::new(LogStats::default());
        let drain = AsyncLogger::new(sender, MsgFormatter, Arc::clone(&stats));
        let logger = Logger::root(drain.fuse(), o!());

        info!(logger, "lost");
        assert_eq!(stats.snapshot().dropped_by(LogDropReason::ChannelClosed), 1);
    }
}
