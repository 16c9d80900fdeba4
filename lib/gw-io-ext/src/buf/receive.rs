/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use crate::{ObjectPool, Reusable};

const MINIMAL_RECEIVE_BUFFER_SIZE: usize = 256;

pub type ReceiveBufferPool = ObjectPool<ReceiveBuffer>;

/// Fixed size buffer used by a single receive operation.
pub struct ReceiveBuffer {
    data: Box<[u8]>,
}

impl ReceiveBuffer {
    pub fn new(size: usize) -> Self {
        ReceiveBuffer {
            data: vec![0; size.max(MINIMAL_RECEIVE_BUFFER_SIZE)].into_boxed_slice(),
        }
    }

    pub fn new_pool(buffer_size: usize, idle_capacity: usize) -> Arc<ReceiveBufferPool> {
        ObjectPool::new(idle_capacity, move || ReceiveBuffer::new(buffer_size))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub(crate) fn filled(&self, len: usize) -> &[u8] {
        &self.data[..len]
    }
}

impl Reusable for ReceiveBuffer {
    fn recycle(&mut self) {
        // never leak one session's data into another one
        self.data.fill(0);
    }
}
