/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("empty domain")]
    EmptyDomain,
    #[error("no address found")]
    NotFound,
    #[error("driver error: {0}")]
    FromDriver(String),
}

impl ResolveError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveError::EmptyDomain => "EmptyDomain",
            ResolveError::NotFound => "NotFound",
            ResolveError::FromDriver(_) => "DriverError",
        }
    }
}

impl From<io::Error> for ResolveError {
    fn from(e: io::Error) -> Self {
        ResolveError::FromDriver(e.to_string())
    }
}
