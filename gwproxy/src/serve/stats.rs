/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Session counters of one gateway server.
#[derive(Default)]
pub struct ServerStats {
    accepted: AtomicU64,
    failed: AtomicU64,
    timeout: AtomicU64,
    alive: AtomicI64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerStatsSnapshot {
    pub accepted: u64,
    pub failed: u64,
    pub timeout: u64,
    pub alive: i64,
}

impl ServerStats {
    pub(crate) fn add_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_timeout(&self) {
        self.timeout.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_alive(&self) {
        self.alive.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dec_alive(&self) {
        self.alive.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get_alive_count(&self) -> i64 {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ServerStatsSnapshot {
        ServerStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timeout: self.timeout.load(Ordering::Relaxed),
            alive: self.get_alive_count(),
        }
    }
}

impl fmt::Display for ServerStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accepted: {}, failed: {}, timeout: {}, alive: {}",
            self.accepted, self.failed, self.timeout, self.alive
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot() {
        let stats = ServerStats::default();
        stats.add_accepted();
        stats.add_accepted();
        stats.inc_alive();
        stats.inc_alive();
        stats.dec_alive();
        stats.add_failed();
        stats.add_timeout();

        let snap = stats.snapshot();
        assert_eq!(
            snap,
            ServerStatsSnapshot {
                accepted: 2,
                failed: 1,
                timeout: 1,
                alive: 1,
            }
        );
        assert_eq!(
            snap.to_string(),
            "accepted: 2, failed: 1, timeout: 1, alive: 1"
        );
    }
}
