/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod primary;
pub use primary::{as_bool, as_string, as_u16, as_u32, as_usize};

mod net;
pub use net::{as_sockaddr, as_tcp_listen_config};
