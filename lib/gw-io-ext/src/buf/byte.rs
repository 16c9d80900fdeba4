/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use bytes::Bytes;

use crate::Reusable;

const DEFAULT_CAPACITY: usize = 64;
const LARGE_GROW_UNIT: usize = 64 * 1024; // 64KB

/// Append only byte accumulator with a consumed prefix.
///
/// Only the `len` bytes after `start` are ever exposed, so the storage is never cleared.
#[derive(Debug)]
pub struct ByteBuffer {
    buf: Box<[u8]>,
    start: usize,
    len: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        ByteBuffer::new()
    }
}

impl ByteBuffer {
    pub fn new() -> Self {
        ByteBuffer::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            buf: vec![0; capacity].into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.start..self.start + self.len]
    }

    pub fn append(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let required = self.len + data.len();
        if self.start + required > self.buf.len() {
            if required <= self.buf.len() {
                self.compact();
            } else {
                self.grow(required);
            }
        }
        let end = self.start + self.len;
        self.buf[end..end + data.len()].copy_from_slice(data);
        self.len = required;
    }

    fn grow(&mut self, required: usize) {
        let new_capacity = if required > LARGE_GROW_UNIT {
            required.div_ceil(LARGE_GROW_UNIT) * LARGE_GROW_UNIT
        } else {
            let mut capacity = self.buf.len().max(1);
            while capacity < required {
                capacity <<= 1;
            }
            capacity
        };

        let mut buf = vec![0; new_capacity].into_boxed_slice();
        buf[..self.len].copy_from_slice(self.as_slice());
        self.buf = buf;
        self.start = 0;
    }

    /// Mark `n` bytes at the front as consumed, `n` is capped to the current length.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.len -= n;
        if self.len == 0 {
            self.start = 0;
        } else {
            self.start += n;
        }
    }

    /// Move the unconsumed bytes to the front of the storage.
    pub fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.buf.copy_within(self.start..self.start + self.len, 0);
        self.start = 0;
    }

    /// Take out all unconsumed bytes, leaving the buffer empty.
    pub fn take_remaining(&mut self) -> Bytes {
        let data = Bytes::copy_from_slice(self.as_slice());
        self.clear();
        data
    }

    #[inline]
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }
}

impl Reusable for ByteBuffer {
    fn recycle(&mut self) {
        self.clear();
    }
}
