/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, Weak};

/// Objects that can be handed out by an [`ObjectPool`] more than once.
pub trait Reusable {
    /// Called each time the object is taken out of the pool.
    fn reinitialize(&mut self) {}

    /// Called each time the object is given back, should drop all per-use state.
    fn recycle(&mut self);
}

type Generator<T> = Box<dyn Fn() -> T + Send + Sync>;

pub struct ObjectPool<T> {
    idle: Mutex<Vec<T>>,
    idle_capacity: usize,
    generator: Generator<T>,
}

impl<T: Reusable> ObjectPool<T> {
    pub fn new<G>(idle_capacity: usize, generator: G) -> Arc<Self>
    where
        G: Fn() -> T + Send + Sync + 'static,
    {
        Arc::new(ObjectPool {
            idle: Mutex::new(Vec::with_capacity(idle_capacity.min(64))),
            idle_capacity,
            generator: Box::new(generator),
        })
    }

    pub fn pop(self: &Arc<Self>) -> Pooled<T> {
        let idle = self.idle.lock().unwrap().pop();
        let mut item = idle.unwrap_or_else(|| (self.generator)());
        item.reinitialize();
        Pooled {
            item: ManuallyDrop::new(item),
            pool: Arc::downgrade(self),
        }
    }

    fn push(&self, mut item: T) {
        item.recycle();
        let mut idle = self.idle.lock().unwrap();
        if idle.len() < self.idle_capacity {
            idle.push(item);
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap().len()
    }
}

/// An object borrowed from a pool, it goes back to the pool on drop.
pub struct Pooled<T: Reusable> {
    item: ManuallyDrop<T>,
    pool: Weak<ObjectPool<T>>,
}

impl<T: Reusable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

impl<T: Reusable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.item
    }
}

impl<T: Reusable> Drop for Pooled<T> {
    fn drop(&mut self) {
        // SAFETY: the item is never accessed again after this
        let item = unsafe { ManuallyDrop::take(&mut self.item) };
        if let Some(pool) = self.pool.upgrade() {
            pool.push(item);
        }
    }
}
