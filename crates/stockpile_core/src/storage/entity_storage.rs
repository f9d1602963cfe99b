//! # Entity Storage Engine
//!
//! Dense active set with swap-remove, two deferred buffers and the stock.
//!
//! ```text
//!  append(_, false) ──> [pending ] ──┐
//!  append(_, true)  ──> [reserved] ──┼── flush ──> [active: 0 .. len) ── retire ──┬──> stock[key]
//!  append_immediate ─────────────────┘                                           └──> destroy + release
//!                                     ^                                          │
//!                                     └──────────── pop(key) ────────────────────┘
//! ```
//!
//! ## Ordering
//!
//! Removal moves the last active entity into the vacated slot. Indices and
//! iteration order are NOT stable across any removal.

use super::stats::StorageStats;
use crate::config::MAX_CAPACITY;
use crate::entity::{Entity, EntityId, PooledEntity, ResourceKey};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Owns every entity of one pool.
///
/// # Type Parameters
///
/// * `E` - The pooled entity type
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: EntityStorage<Spark> = EntityStorage::new(64);
/// storage.append(PooledEntity::new(EntityId::new(0), "fx/spark".into(), spark), false);
/// storage.flush();
/// assert_eq!(storage.len(), 1);
/// ```
pub struct EntityStorage<E: Entity> {
    /// Live entities, dense in `[0, len)`.
    active: Vec<PooledEntity<E>>,
    /// Logical capacity of the active set.
    capacity: usize,
    /// Deferred entities activated at the next flush.
    pending: Vec<PooledEntity<E>>,
    /// Deferred entities committed inactive at the next flush.
    reserved: Vec<PooledEntity<E>>,
    /// Retired entities per key, LIFO. Cleanup has already run on all of them.
    stock: HashMap<ResourceKey, Vec<PooledEntity<E>>>,
    /// Running counters.
    stats: StorageStats,
}

impl<E: Entity> EntityStorage<E> {
    /// Creates storage with room for `capacity` active entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or above [`MAX_CAPACITY`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= MAX_CAPACITY,
            "Capacity {capacity} exceeds the maximum of {MAX_CAPACITY}"
        );

        Self {
            active: Vec::with_capacity(capacity),
            capacity,
            pending: Vec::new(),
            reserved: Vec::new(),
            stock: HashMap::new(),
            stats: StorageStats::default(),
        }
    }

    /// Number of active entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns true if the active set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Current capacity of the active set.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entities waiting in the activating buffer.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Entities waiting in the reserved buffer.
    #[inline]
    #[must_use]
    pub fn reserved_len(&self) -> usize {
        self.reserved.len()
    }

    /// Entities stocked under `key`.
    #[must_use]
    pub fn stock_len(&self, key: &ResourceKey) -> usize {
        self.stock.get(key).map_or(0, Vec::len)
    }

    /// Entities stocked across all keys.
    #[must_use]
    pub fn stocked_len(&self) -> usize {
        self.stock.values().map(Vec::len).sum()
    }

    /// Whether retirements of `key` are recycled.
    #[must_use]
    pub fn is_stock_enabled(&self, key: &ResourceKey) -> bool {
        self.stock.contains_key(key)
    }

    /// Running counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> StorageStats {
        self.stats
    }

    /// Returns the active entities.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[PooledEntity<E>] {
        &self.active
    }

    /// Iterates over the active entities.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PooledEntity<E>> {
        self.active.iter()
    }

    /// Iterates mutably over the active entities.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PooledEntity<E>> {
        self.active.iter_mut()
    }

    /// Finds an active or deferred entity by id.
    ///
    /// Stocked entities are retired and not reachable here.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&PooledEntity<E>> {
        self.active
            .iter()
            .chain(&self.pending)
            .chain(&self.reserved)
            .find(|pooled| pooled.id == id)
    }

    /// Finds an active or deferred entity by id, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut PooledEntity<E>> {
        self.active
            .iter_mut()
            .chain(self.pending.iter_mut())
            .chain(self.reserved.iter_mut())
            .find(|pooled| pooled.id == id)
    }

    /// Whether `id` is held anywhere in this storage, stock included.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
            || self
                .stock
                .values()
                .any(|bucket| bucket.iter().any(|pooled| pooled.id == id))
    }

    /// Queues an entity for the next [`flush`](Self::flush).
    ///
    /// Reserved entities are committed inactive, the rest are activated.
    pub fn append(&mut self, entity: PooledEntity<E>, defer_to_reserve: bool) {
        debug_assert!(
            !self.contains(entity.id),
            "entity {} is already held by this storage",
            entity.id
        );

        if defer_to_reserve {
            self.reserved.push(entity);
        } else {
            self.pending.push(entity);
        }
    }

    /// Inserts straight into the active set and activates the entity.
    pub fn append_immediate(&mut self, entity: PooledEntity<E>) {
        debug_assert!(
            !self.contains(entity.id),
            "entity {} is already held by this storage",
            entity.id
        );

        self.insert_active(entity, true);
    }

    /// Commits both deferred buffers into the active set.
    ///
    /// Pending entities go first and are activated, reserved ones follow
    /// inactive. Buffer allocations are kept for the next cycle.
    pub fn flush(&mut self) {
        let mut pending = std::mem::take(&mut self.pending);
        for pooled in pending.drain(..) {
            self.insert_active(pooled, true);
        }
        self.pending = pending;

        let mut reserved = std::mem::take(&mut self.reserved);
        for pooled in reserved.drain(..) {
            self.insert_active(pooled, false);
        }
        self.reserved = reserved;
    }

    /// Takes the most recently stocked entity for `key`.
    ///
    /// Setup has NOT run on the returned entity.
    pub fn pop(&mut self, key: &ResourceKey) -> Option<PooledEntity<E>> {
        let pooled = self.stock.get_mut(key)?.pop()?;
        self.stats.stock_hits += 1;
        trace!(key = %key, id = %pooled.id, "stock hit");
        Some(pooled)
    }

    /// Starts recycling retirements of `key`. Idempotent.
    ///
    /// The non-recyclable key is ignored.
    pub fn enable_stock(&mut self, key: &ResourceKey) {
        if !key.is_recyclable() {
            debug!("ignoring stock request for non-recyclable key");
            return;
        }
        if !self.stock.contains_key(key) {
            debug!(key = %key, "stock enabled");
            self.stock.insert(key.clone(), Vec::new());
        }
    }

    /// Stops recycling `key`, destroying anything still stocked under it.
    ///
    /// Returns the number of entities destroyed.
    pub fn disable_stock(&mut self, key: &ResourceKey) -> usize {
        let Some(bucket) = self.stock.remove(key) else {
            return 0;
        };

        let drained = bucket.len();
        if drained > 0 {
            warn!(key = %key, drained, "stock disabled while holding entities, destroying them");
        }
        for pooled in bucket {
            Self::release_entity(pooled, &mut self.stats);
        }
        debug!(key = %key, "stock disabled");
        drained
    }

    /// Retires an active entity. Unknown ids are ignored.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.active.iter().position(|pooled| pooled.id == id) {
            Some(index) => {
                self.retire_at(index);
                true
            }
            None => false,
        }
    }

    /// Retires every active entity whose id is in `ids`.
    ///
    /// Returns the number removed.
    pub fn remove_many(&mut self, ids: &[EntityId]) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.active.len() {
            if ids.contains(&self.active[index].id) {
                // The slot now holds the former last entity, which has not been checked yet.
                self.retire_at(index);
                removed += 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Runs the main update phase on every active entity.
    pub fn execute(&mut self) {
        for pooled in &mut self.active {
            pooled.entity.execute();
        }
    }

    /// Runs the evaluate phase on every active entity.
    pub fn evaluate(&mut self) {
        for pooled in &mut self.active {
            pooled.entity.evaluate();
        }
    }

    /// Runs the fixed-step phase on every active entity.
    pub fn fixed_execute(&mut self) {
        for pooled in &mut self.active {
            pooled.entity.fixed_execute();
        }
    }

    /// Runs the late phase and retires entities that no longer exist.
    ///
    /// Returns the number retired.
    pub fn late_execute(&mut self) -> usize {
        let mut retired = 0;
        let mut index = 0;
        while index < self.active.len() {
            let entity = &mut self.active[index].entity;
            entity.late_execute();
            if entity.is_exist() {
                index += 1;
            } else {
                // Same index again: it was backfilled from the tail.
                self.retire_at(index);
                retired += 1;
            }
        }
        retired
    }

    /// Destroys every entity this storage holds and empties it.
    ///
    /// Stocked entities skip cleanup, it ran when they were retired.
    pub fn clear(&mut self) {
        let active = self.active.len();
        let deferred = self.pending.len() + self.reserved.len();
        let stocked = self.stocked_len();

        for mut pooled in self
            .active
            .drain(..)
            .chain(self.pending.drain(..))
            .chain(self.reserved.drain(..))
        {
            pooled.entity.cleanup();
            Self::release_entity(pooled, &mut self.stats);
        }
        for (_, bucket) in self.stock.drain() {
            for pooled in bucket {
                Self::release_entity(pooled, &mut self.stats);
            }
        }

        debug!(active, deferred, stocked, "storage cleared");
    }

    /// Appends to the active set, growing it first if full.
    fn insert_active(&mut self, mut pooled: PooledEntity<E>, is_active: bool) {
        if self.active.len() >= self.capacity {
            let grown = self.capacity * 2;
            warn!(
                capacity = self.capacity,
                grown, "active set over capacity, growing"
            );
            self.active.reserve_exact(grown - self.active.len());
            self.capacity = grown;
            self.stats.grow_events += 1;
        }

        pooled.entity.set_active(is_active);
        self.active.push(pooled);
        self.stats.peak_active = self.stats.peak_active.max(self.active.len());
    }

    /// Swap-remove of the entity at `index`.
    fn retire_at(&mut self, index: usize) {
        let mut pooled = self.active.swap_remove(index);
        pooled.entity.set_active(false);
        pooled.entity.cleanup();

        match self.stock.get_mut(&pooled.key) {
            Some(bucket) => {
                trace!(key = %pooled.key, id = %pooled.id, "entity stocked");
                bucket.push(pooled);
                self.stats.stocked += 1;
            }
            None => Self::release_entity(pooled, &mut self.stats),
        }
    }

    /// Final teardown of an entity leaving the storage for good.
    fn release_entity(mut pooled: PooledEntity<E>, stats: &mut StorageStats) {
        trace!(key = %pooled.key, id = %pooled.id, "entity destroyed");
        pooled.entity.destroy();
        pooled.entity.release();
        stats.destroyed += 1;
    }
}
