//! # Entity Assembly
//!
//! A typed pool over one [`EntityStorage`]: decides between reusing a
//! stocked entity and constructing a new one, and drives the update phases.
//!
//! ## Creation
//!
//! ```text
//! create(key)
//!   ├─ reuse(key)      stock hit  ──────────────────────────────┐
//!   └─ construct(key)  stock miss ── (await) ── admit(key, e) ──┴─> setup ─> append
//! ```
//!
//! [`EntityAssembly::create`] does all of it in one call. The split form lets
//! the update loop keep running while a construction is in flight:
//! [`EntityAssembly::construct`] returns a future that owns everything it
//! needs and never touches the pool, and [`EntityAssembly::admit`] joins the
//! result back in synchronously.

use crate::factory::EntityFactory;
use crate::host::HostContainer;
use crate::registry::Assembly;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use stockpile_core::{
    ContainerId, Entity, EntityId, EntityStorage, PoolConfig, PoolResult, PooledEntity,
    ResourceKey, StorageStats,
};
use tracing::debug;

/// Where a newly created entity goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    /// Straight into the active set, active and updated this cycle.
    Immediate,
    /// Queued until the next flush, then activated.
    #[default]
    Deferred,
    /// Queued until the next flush, then committed inactive.
    ///
    /// With the default existence check an inactive entity is retired at the
    /// end of its first cycle, so callers activate reserved entities before
    /// `late_execute` or override [`Entity::is_exist`].
    Reserved,
}

/// Pool of one entity kind.
///
/// # Type Parameters
///
/// * `F` - The factory building this pool's entities
pub struct EntityAssembly<F: EntityFactory> {
    /// Pool name, also the name of its host container.
    name: String,
    /// Container every constructed entity is parented under.
    container: ContainerId,
    /// Active set, deferred buffers and stock.
    storage: EntityStorage<F::Entity>,
    /// Shared so construction futures can outlive a pool borrow.
    factory: Arc<F>,
    config: PoolConfig,
    /// Update phases are skipped while false.
    enabled: bool,
    next_id: u64,
}

impl<F: EntityFactory> EntityAssembly<F> {
    /// Creates the pool and its named container under `root`.
    ///
    /// # Arguments
    ///
    /// * `host` - Container hierarchy to create the pool's container in
    /// * `root` - Parent of the pool's container
    /// * `name` - Pool name
    /// * `factory` - Builds entities on stock misses
    /// * `config` - Capacity, stock policy and initial enable state
    ///
    /// # Panics
    ///
    /// Panics if `config.default_capacity` is zero or above
    /// [`MAX_CAPACITY`](stockpile_core::MAX_CAPACITY). Configs loaded through
    /// [`StockpileConfig`](stockpile_core::StockpileConfig) are already checked.
    pub fn setup<H: HostContainer + ?Sized>(
        host: &mut H,
        root: ContainerId,
        name: &str,
        factory: F,
        config: PoolConfig,
    ) -> Self {
        let container = host.create_child(root, name);
        debug!(
            pool = name,
            capacity = config.default_capacity,
            stock = config.stock,
            "pool setup"
        );

        Self {
            name: name.to_string(),
            container,
            storage: EntityStorage::new(config.default_capacity),
            factory: Arc::new(factory),
            enabled: config.enabled,
            config,
            next_id: 0,
        }
    }

    /// Pool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pool's container in the host hierarchy.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// The configuration the pool was set up with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &EntityStorage<F::Entity> {
        &self.storage
    }

    /// Storage counters.
    #[must_use]
    pub fn stats(&self) -> StorageStats {
        self.storage.stats()
    }

    /// Number of active entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns true if no entity is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Looks up an active or queued entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&F::Entity> {
        self.storage.get(id).map(PooledEntity::entity)
    }

    /// Looks up an active or queued entity, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut F::Entity> {
        self.storage.get_mut(id).map(PooledEntity::entity_mut)
    }

    /// Iterates over the active entities. Order is unstable across removals.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &F::Entity)> {
        self.storage
            .iter()
            .map(|pooled| (pooled.id(), pooled.entity()))
    }

    /// Resumes the update phases.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Skips the update phases until re-enabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether the update phases run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Destroys every entity the pool holds, stock included.
    pub fn cleanup(&mut self) {
        debug!(pool = %self.name, "pool cleanup");
        self.storage.clear();
    }

    /// Creates an entity for `key`, reusing a stocked one if possible.
    ///
    /// Suspends only when a new entity has to be constructed.
    ///
    /// # Errors
    ///
    /// Returns the factory's error if construction fails. The pool is left
    /// untouched in that case.
    pub async fn create(&mut self, key: ResourceKey, activation: Activation) -> PoolResult<EntityId> {
        if let Some(id) = self.reuse(&key, activation) {
            return Ok(id);
        }

        let entity = self.construct(key.clone()).await?;
        Ok(self.admit(key, entity, activation))
    }

    /// Takes a stocked entity for `key`, sets it up and inserts it.
    ///
    /// Returns `None` on a stock miss; the caller then constructs.
    pub fn reuse(&mut self, key: &ResourceKey, activation: Activation) -> Option<EntityId> {
        let pooled = self.storage.pop(key)?;
        Some(self.activate(pooled, activation))
    }

    /// Starts building a new entity for `key`.
    ///
    /// The future holds no borrow of the pool. Dropping it abandons the
    /// construction; no cancellation is signalled to the factory.
    pub fn construct(
        &self,
        key: ResourceKey,
    ) -> impl Future<Output = PoolResult<F::Entity>> + 'static {
        let factory = Arc::clone(&self.factory);
        async move { factory.construct(&key).await }
    }

    /// Inserts a freshly constructed entity.
    ///
    /// Parents it under the pool container and, when the pool stocks, starts
    /// recycling `key` so later retirements come back here.
    pub fn admit(&mut self, key: ResourceKey, entity: F::Entity, activation: Activation) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let mut pooled = PooledEntity::new(id, key, entity);
        pooled.entity_mut().set_parent(self.container);
        if self.config.stock {
            self.storage.enable_stock(pooled.resource_key());
        }
        self.activate(pooled, activation)
    }

    /// Retires an active entity. Unknown or queued ids are ignored.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        self.storage.remove(id)
    }

    /// Retires every active entity in `ids`.
    pub fn destroy_many(&mut self, ids: &[EntityId]) -> usize {
        self.storage.remove_many(ids)
    }

    /// Commits queued entities.
    pub fn flush(&mut self) {
        if self.enabled {
            self.storage.flush();
        }
    }

    /// Runs the main update phase.
    pub fn execute(&mut self) {
        if self.enabled {
            self.storage.execute();
        }
    }

    /// Runs the evaluate phase.
    pub fn evaluate(&mut self) {
        if self.enabled {
            self.storage.evaluate();
        }
    }

    /// Runs the fixed-step phase.
    pub fn fixed_execute(&mut self) {
        if self.enabled {
            self.storage.fixed_execute();
        }
    }

    /// Runs the late phase. Returns the number of entities retired.
    pub fn late_execute(&mut self) -> usize {
        if self.enabled {
            self.storage.late_execute()
        } else {
            0
        }
    }

    fn activate(&mut self, mut pooled: PooledEntity<F::Entity>, activation: Activation) -> EntityId {
        let id = pooled.id();
        pooled.entity_mut().setup();

        match activation {
            Activation::Immediate => self.storage.append_immediate(pooled),
            Activation::Deferred => {
                pooled.entity_mut().set_active(false);
                self.storage.append(pooled, false);
            }
            Activation::Reserved => {
                pooled.entity_mut().set_active(false);
                self.storage.append(pooled, true);
            }
        }
        id
    }
}

impl<F: EntityFactory> Assembly for EntityAssembly<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn cleanup(&mut self) {
        Self::cleanup(self);
    }

    fn flush(&mut self) {
        Self::flush(self);
    }

    fn execute(&mut self) {
        Self::execute(self);
    }

    fn evaluate(&mut self) {
        Self::evaluate(self);
    }

    fn late_execute(&mut self) {
        Self::late_execute(self);
    }

    fn fixed_execute(&mut self) {
        Self::fixed_execute(self);
    }

    fn enable(&mut self) {
        Self::enable(self);
    }

    fn disable(&mut self) {
        Self::disable(self);
    }

    fn is_enabled(&self) -> bool {
        Self::is_enabled(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
