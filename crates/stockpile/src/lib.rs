//! # STOCKPILE
//!
//! Managed pools of heavyweight entities: create, reuse, retire.
//!
//! ## Architecture
//!
//! ```text
//!  PoolRegistry (composition root)
//!     ├── EntityAssembly<BulletFactory>  ──> EntityStorage<Bullet>
//!     └── EntityAssembly<DebrisFactory>  ──> EntityStorage<Debris>
//!
//!  create(key) ── pop(key) hit ─────────────────────┐
//!        └─────── miss ──> factory.construct(key) ──┴──> setup ──> append
//! ```
//!
//! ## Cycle
//!
//! Every registered pool runs `flush -> execute -> evaluate -> late_execute`
//! once per cycle via [`PoolRegistry::tick`]. Nothing here is thread-safe:
//! one writer drives all pools.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stockpile::{Activation, EntityAssembly, Hierarchy, PoolConfig, PoolRegistry};
//!
//! let mut hierarchy = Hierarchy::new("World");
//! let root = hierarchy.root();
//! let mut registry = PoolRegistry::new();
//!
//! type BulletPool = EntityAssembly<BulletFactory>;
//!
//! registry.create_instance(BulletPool::setup(
//!     &mut hierarchy, root, "BulletPool", BulletFactory::default(), PoolConfig::default(),
//! ));
//!
//! if let Some(bullets) = registry.instance_mut::<BulletPool>() {
//!     let id = bullets.create("weapons/bullet".into(), Activation::Deferred).await?;
//! }
//!
//! registry.tick();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod assembly;
pub mod factory;
pub mod host;
pub mod registry;

pub use assembly::{Activation, EntityAssembly};
pub use factory::EntityFactory;
pub use host::{Hierarchy, HostContainer};
pub use registry::{Assembly, PoolRegistry};

pub use stockpile_core::{
    ContainerId, Entity, EntityId, EntityStorage, PoolConfig, PoolError, PoolResult,
    PooledEntity, ResourceKey, StockpileConfig, StorageStats, MAX_CAPACITY,
};
