//! # Entity Storage
//!
//! Ownership of every pooled entity, split into three places:
//! - the dense active set that the update phases iterate,
//! - two deferred buffers committed at `flush`,
//! - the per-key stock of retired entities.
//!
//! An entity lives in exactly one of them at a time.

mod entity_storage;
mod stats;

pub use entity_storage::EntityStorage;
pub use stats::StorageStats;
