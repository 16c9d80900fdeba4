/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod buf;
pub use buf::{ByteBuffer, ReceiveBuffer, ReceiveBufferPool};

mod pool;
pub use pool::{ObjectPool, Pooled, Reusable};

mod conn;
pub use conn::{Connection, ConnectionError, ConnectionRole, ConnectionState};

pub mod relay;
