//! # STOCKPILE Core
//!
//! Storage engine for pools of heavyweight entities:
//! - A dense, order-irrelevant active set with O(1) swap-remove
//! - Two deferred insert buffers committed once per cycle
//! - A per-key stock of retired entities handed back out instead of destroyed
//!
//! ## Cycle Order
//!
//! ```text
//! flush -> execute -> evaluate -> late_execute
//! ```
//!
//! The storage assumes a single writer. Nothing here synchronizes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stockpile_core::{EntityStorage, PooledEntity, EntityId, ResourceKey};
//!
//! let mut storage = EntityStorage::new(128);
//! let key = ResourceKey::new("enemy/grunt");
//! storage.enable_stock(&key);
//! storage.append(PooledEntity::new(EntityId::new(0), key.clone(), grunt), false);
//! storage.flush();
//! storage.execute();
//! storage.late_execute();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod entity;
pub mod error;
pub mod storage;

pub use config::{PoolConfig, StockpileConfig, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use entity::{ContainerId, Entity, EntityId, PooledEntity, ResourceKey};
pub use error::{PoolError, PoolResult};
pub use storage::{EntityStorage, StorageStats};
