use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

type Registry = Arc<StdMutex<HashMap<i32, Arc<Mutex<()>>>>>;

/// One async mutex per aggregate id.
///
/// Serializes read-modify-save sequences on the same department so that two
/// concurrent city mutations cannot overwrite each other's collection.
/// An entry lives only while some task holds or waits on it.
#[derive(Default)]
pub struct AggregateLocks {
    inner: Registry,
}

/// Exclusive access to one aggregate; the registry entry is dropped with the
/// last guard.
pub struct AggregateGuard {
    id: i32,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Registry,
}

impl Drop for AggregateGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // map entry + this guard: nobody else holds or waits
        let idle = Arc::strong_count(&self.lock) == 2;
        if idle && map.get(&self.id).is_some_and(|l| Arc::ptr_eq(l, &self.lock)) {
            map.remove(&self.id);
        }
    }
}

impl AggregateLocks {
    pub fn new() -> Self { Self::default() }

    /// Waits for exclusive access to aggregate `id`; released on drop.
    pub async fn acquire(&self, id: i32) -> AggregateGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(id).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        AggregateGuard { id, lock, guard: Some(guard), registry: Arc::clone(&self.inner) }
    }

    /// Locks every id in ascending order, so two callers needing overlapping
    /// sets cannot deadlock. Duplicates are locked once.
    pub async fn acquire_many(&self, ids: impl IntoIterator<Item = i32>) -> Vec<AggregateGuard> {
        let mut ids: Vec<i32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }

    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
