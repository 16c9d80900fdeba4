/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod byte;
pub use byte::ByteBuffer;

mod receive;
pub use receive::{ReceiveBuffer, ReceiveBufferPool};
