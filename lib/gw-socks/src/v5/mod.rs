/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod auth;
pub use auth::{Socks5Greeting, Socks5MethodSelection};

mod request;
pub use request::Socks5Request;

mod reply;
pub use reply::Socks5Reply;
