/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogDropReason {
    FormatFailed,
    ChannelClosed,
    ChannelOverflow,
    WriteFailed,
}

impl LogDropReason {
    const COUNT: usize = 4;
}

#[derive(Default, Debug, Eq, PartialEq)]
pub struct LogSnapshot {
    pub total: u64,
    pub written: u64,
    pub written_bytes: u64,
    pub dropped: [u64; LogDropReason::COUNT],
}

impl LogSnapshot {
    #[inline]
    pub fn dropped_by(&self, reason: LogDropReason) -> u64 {
        self.dropped[reason as usize]
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped.iter().sum()
    }
}

/// Counters shared by the drain side and the writer thread of one logger.
#[derive(Default)]
pub struct LogStats {
    total: AtomicU64,
    written: AtomicU64,
    written_bytes: AtomicU64,
    dropped: [AtomicU64; LogDropReason::COUNT],
}

impl LogStats {
    pub fn add_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_written(&self, size: usize) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.written_bytes.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn add_dropped(&self, reason: LogDropReason) {
        self.dropped[reason as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            total: self.total.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            written_bytes: self.written_bytes.load(Ordering::Relaxed),
            dropped: std::array::from_fn(|i| self.dropped[i].load(Ordering::Relaxed)),
        }
    }
}
