/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::{Socks5DecodeError, SocksNegotiationError};

mod auth;
pub use auth::SocksAuthMethod;

mod cmd;
pub use cmd::SocksCommand;
