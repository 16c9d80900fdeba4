/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::ResolveError;

mod config;
pub use config::ResolverConfig;

mod driver;
pub use driver::{ArcResolver, ResolvedRecord, Resolver, SystemResolver};

mod cache;
pub use cache::CachedResolver;

mod upstream;
pub use upstream::resolve_upstream;
