//! Page builder pool
//!
//! Writers reuse page builders instead of allocating encoders per stream.
//! Idle builders are keyed by (schema identity, row capacity); a builder is
//! reset before it becomes available again, so an acquired builder is always
//! empty. Keys whose schema is owned only by idle builders are evicted the
//! next time a new key is added.

use crate::page::PageBuilder;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use scrt_core::{Result, Schema};
use std::sync::Arc;
use tracing::trace;

/// Default number of idle builders kept per key.
pub const DEFAULT_MAX_IDLE: usize = 8;

// =============================================================================
// Process-wide pool
// =============================================================================
//
// Pooled builders hold an `Arc` of their schema, so a schema address used as
// a key cannot be freed and reused while a builder for it is idle.

static GLOBAL_POOL: Lazy<Arc<BuilderPool>> =
    Lazy::new(|| Arc::new(BuilderPool::new(DEFAULT_MAX_IDLE)));

type PoolKey = (usize, usize);

fn key_for(schema: &Arc<Schema>, capacity: usize) -> PoolKey {
    (Arc::as_ptr(schema) as usize, capacity)
}

/// Free list of page builders shared across writers.
#[derive(Debug)]
pub struct BuilderPool {
    idle: Mutex<FxHashMap<PoolKey, Vec<PageBuilder>>>,
    max_idle_per_key: usize,
}

impl BuilderPool {
    /// Pool keeping at most `max_idle_per_key` idle builders per key.
    pub fn new(max_idle_per_key: usize) -> Self {
        BuilderPool {
            idle: Mutex::new(FxHashMap::default()),
            max_idle_per_key,
        }
    }

    /// The process-wide pool.
    pub fn global() -> Arc<BuilderPool> {
        Arc::clone(&GLOBAL_POOL)
    }

    /// Take an idle builder for `schema` and `capacity`, or build a new one.
    pub fn acquire(&self, schema: &Arc<Schema>, capacity: usize) -> Result<PageBuilder> {
        let key = key_for(schema, capacity);
        let reused = {
            let mut idle = self.idle.lock();
            let builder = idle.get_mut(&key).and_then(Vec::pop);
            if idle.get(&key).map_or(false, Vec::is_empty) {
                idle.remove(&key);
            }
            builder
        };
        match reused {
            Some(builder) => {
                trace!(schema = schema.name(), capacity, "Reused pooled page builder");
                Ok(builder)
            }
            None => {
                trace!(schema = schema.name(), capacity, "Allocated page builder");
                PageBuilder::new(Arc::clone(schema), capacity)
            }
        }
    }

    /// Return a builder. It is reset first; it is dropped if its key already
    /// has the maximum number of idle builders, or if nothing outside the
    /// builder still holds its schema.
    pub fn release(&self, mut builder: PageBuilder) {
        if Arc::strong_count(builder.schema()) == 1 {
            trace!(
                schema = builder.schema().name(),
                capacity = builder.row_limit(),
                "Dropped page builder of a released schema"
            );
            return;
        }
        builder.reset();
        let key = key_for(builder.schema(), builder.row_limit());
        let mut idle = self.idle.lock();
        if !idle.contains_key(&key) {
            evict_orphans(&mut idle);
        }
        let slot = idle.entry(key).or_default();
        if slot.len() < self.max_idle_per_key {
            trace!(
                schema = builder.schema().name(),
                capacity = builder.row_limit(),
                "Released page builder to pool"
            );
            slot.push(builder);
        }
    }

    /// Idle builders for `schema` and `capacity`.
    pub fn idle_count(&self, schema: &Arc<Schema>, capacity: usize) -> usize {
        self.idle
            .lock()
            .get(&key_for(schema, capacity))
            .map_or(0, Vec::len)
    }

    /// Number of (schema, capacity) keys with idle builders.
    pub fn key_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Drop every idle builder.
    pub fn clear(&self) {
        self.idle.lock().clear();
    }
}

/// Drop keys whose schema has no owner besides the idle builders themselves.
fn evict_orphans(idle: &mut FxHashMap<PoolKey, Vec<PageBuilder>>) {
    let mut held: FxHashMap<usize, usize> = FxHashMap::default();
    for ((schema, _), builders) in idle.iter() {
        *held.entry(*schema).or_default() += builders.len();
    }
    idle.retain(|(schema, _), builders| match builders.first() {
        Some(b) => Arc::strong_count(b.schema()) > held.get(schema).copied().unwrap_or(0),
        None => false,
    });
}

impl Default for BuilderPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrt_core::{Field, FieldKind};
    use std::thread;

    fn schema(name: &str) -> Arc<Schema> {
        let schema = Schema::new(name, vec![Field::new("A", FieldKind::Uint64)]);
        schema.finalize().unwrap();
        Arc::new(schema)
    }

    #[test]
    fn test_released_builders_are_reset() {
        let pool = BuilderPool::new(2);
        let schema = schema("S");
        let mut b = pool.acquire(&schema, 4).unwrap();
        b.append_uint(0, 1).unwrap();
        b.record_presence(0, true).unwrap();
        b.seal_row().unwrap();
        pool.release(b);
        assert_eq!(pool.idle_count(&schema, 4), 1);

        let b = pool.acquire(&schema, 4).unwrap();
        assert!(b.is_empty());
        assert_eq!(pool.idle_count(&schema, 4), 0);
    }

    #[test]
    fn test_keyed_by_schema_and_capacity() {
        let pool = BuilderPool::new(2);
        let a = schema("A");
        let b = schema("B");
        pool.release(pool.acquire(&a, 4).unwrap());
        assert_eq!(pool.idle_count(&a, 4), 1);
        assert_eq!(pool.idle_count(&a, 8), 0);
        assert_eq!(pool.idle_count(&b, 4), 0);

        let other = pool.acquire(&b, 4).unwrap();
        assert_eq!(other.schema().name(), "B");
        assert_eq!(pool.idle_count(&a, 4), 1);
    }

    #[test]
    fn test_idle_cap() {
        let pool = BuilderPool::new(1);
        let s = schema("S");
        let first = pool.acquire(&s, 4).unwrap();
        let second = pool.acquire(&s, 4).unwrap();
        pool.release(first);
        pool.release(second);
        assert_eq!(pool.idle_count(&s, 4), 1);
        pool.clear();
        assert_eq!(pool.idle_count(&s, 4), 0);
    }

    #[test]
    fn test_builder_of_dropped_schema_is_not_kept() {
        let pool = BuilderPool::new(2);
        let s = schema("Transient");
        let weak = Arc::downgrade(&s);
        let b = pool.acquire(&s, 4).unwrap();
        drop(s);
        pool.release(b);
        assert_eq!(pool.key_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_orphaned_keys_are_evicted() {
        let pool = BuilderPool::new(2);
        let first = schema("First");
        let weak = Arc::downgrade(&first);
        pool.release(pool.acquire(&first, 4).unwrap());
        pool.release(pool.acquire(&first, 8).unwrap());
        drop(first);
        assert_eq!(pool.key_count(), 2);

        // Adding a new key sweeps keys only the pool keeps alive.
        let second = schema("Second");
        pool.release(pool.acquire(&second, 4).unwrap());
        assert_eq!(pool.key_count(), 1);
        assert!(weak.upgrade().is_none());

        // Emptied keys are removed on acquire.
        let _b = pool.acquire(&second, 4).unwrap();
        assert_eq!(pool.key_count(), 0);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BuilderPool::new(4));
        let s = schema("S");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let s = Arc::clone(&s);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let b = pool.acquire(&s, 16).unwrap();
                        assert!(b.is_empty());
                        pool.release(b);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.idle_count(&s, 16) <= 4);
    }
}
