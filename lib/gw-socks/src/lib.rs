/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod types;
pub use types::{Socks5DecodeError, SocksAuthMethod, SocksCommand, SocksNegotiationError};

pub mod v5;
