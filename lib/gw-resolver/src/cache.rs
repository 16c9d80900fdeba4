/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use log::trace;
use lru::LruCache;

use crate::{ResolveError, ResolvedRecord, Resolver, ResolverConfig};

struct CacheEntry {
    result: Result<ResolvedRecord, ResolveError>,
    expire: Instant,
}

/// A resolver wrapper which caches both positive and negative results.
///
/// Expired entries are dropped lazily on lookup, and the least recently used entry is
/// evicted once the capacity is reached.
pub struct CachedResolver<R> {
    driver: R,
    config: ResolverConfig,
    cache: Option<Mutex<LruCache<String, CacheEntry, ahash::RandomState>>>,
}

impl<R> CachedResolver<R> {
    pub fn new(driver: R, config: ResolverConfig) -> Self {
        let cache = NonZeroUsize::new(config.cache_capacity())
            .map(|size| Mutex::new(LruCache::with_hasher(size, ahash::RandomState::new())));
        CachedResolver {
            driver,
            config,
            cache,
        }
    }

    /// Number of cached entries, including the expired ones not yet dropped.
    pub fn cached_count(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.lock().unwrap().len(),
            None => 0,
        }
    }

    fn get_cached(
        &self,
        domain: &str,
        now: Instant,
    ) -> Option<Result<ResolvedRecord, ResolveError>> {
        let mut cache = self.cache.as_ref()?.lock().unwrap();
        let entry = cache.get(domain)?;
        if entry.expire > now {
            return Some(entry.result.clone());
        }
        cache.pop(domain);
        None
    }

    fn store(&self, domain: String, result: &Result<ResolvedRecord, ResolveError>, now: Instant) {
        let Some(cache) = &self.cache else {
            return;
        };
        let ttl = match result {
            Ok(r) => self.config.positive_ttl(r.ttl),
            Err(_) => self.config.negative_ttl(),
        };
        let Some(expire) = now.checked_add(ttl) else {
            return;
        };
        let entry = CacheEntry {
            result: result.clone(),
            expire,
        };
        cache.lock().unwrap().put(domain, entry);
    }
}

impl<R> CachedResolver<R>
where
    R: Resolver + Send + Sync,
{
    async fn resolve_at(&self, domain: &str, now: Instant) -> Result<ResolvedRecord, ResolveError> {
        let domain = domain.to_ascii_lowercase();
        if let Some(r) = self.get_cached(&domain, now) {
            trace!("resolve {domain}: cache hit");
            return r;
        }

        let r = self.driver.resolve(&domain).await;
        self.store(domain, &r, now);
        r
    }
}

#[async_trait]
impl<R> Resolver for CachedResolver<R>
where
    R: Resolver + Send + Sync,
{
    async fn resolve(&self, domain: &str) -> Result<ResolvedRecord, ResolveError> {
        self.resolve_at(domain, Instant::now()).await
    }
}
