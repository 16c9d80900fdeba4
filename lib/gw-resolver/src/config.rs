/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

const DEFAULT_CACHE_CAPACITY: usize = 4096;
const DEFAULT_MIN_TTL: Duration = Duration::from_secs(30);
const DEFAULT_MAX_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    cache_capacity: usize,
    min_ttl: Duration,
    max_ttl: Duration,
    negative_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            min_ttl: DEFAULT_MIN_TTL,
            max_ttl: DEFAULT_MAX_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
        }
    }
}

impl ResolverConfig {
    /// Set the max number of cached domains, 0 to disable the cache.
    #[inline]
    pub fn set_cache_capacity(&mut self, capacity: usize) {
        self.cache_capacity = capacity;
    }

    #[inline]
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    #[inline]
    pub fn set_min_ttl(&mut self, ttl: Duration) {
        self.min_ttl = ttl;
    }

    #[inline]
    pub fn min_ttl(&self) -> Duration {
        self.min_ttl
    }

    #[inline]
    pub fn set_max_ttl(&mut self, ttl: Duration) {
        self.max_ttl = ttl;
    }

    #[inline]
    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    #[inline]
    pub fn set_negative_ttl(&mut self, ttl: Duration) {
        self.negative_ttl = ttl;
    }

    #[inline]
    pub fn negative_ttl(&self) -> Duration {
        self.negative_ttl
    }

    /// Clamp the ttl of a positive record, records without ttl use `min_ttl`.
    pub fn positive_ttl(&self, ttl: Option<Duration>) -> Duration {
        ttl.unwrap_or(self.min_ttl).clamp(self.min_ttl, self.max_ttl)
    }

    pub fn check(&mut self) {
        if self.max_ttl < self.min_ttl {
            self.max_ttl = self.min_ttl;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp() {
        let config = ResolverConfig::default();
        assert_eq!(config.positive_ttl(None), Duration::from_secs(30));
        assert_eq!(config.positive_ttl(Some(Duration::from_secs(1))), Duration::from_secs(30));
        assert_eq!(config.positive_ttl(Some(Duration::from_secs(300))), Duration::from_secs(300));
        assert_eq!(config.positive_ttl(Some(Duration::from_secs(86400))), Duration::from_secs(3600));
    }

    #[test]
    fn check() {
        let mut config = ResolverConfig::default();
        config.set_min_ttl(Duration::from_secs(60));
        config.set_max_ttl(Duration::from_secs(10));
        config.check();
        assert_eq!(config.max_ttl(), Duration::from_secs(60));
        assert_eq!(config.positive_ttl(None), Duration::from_secs(60));
    }
}
