//! # Entity Factory
//!
//! The construction collaborator. Building the heavyweight resource behind an
//! entity (loading assets, instantiating scene objects) happens here and may
//! suspend; the pool itself never blocks on it.

use std::future::Future;
use stockpile_core::{Entity, PoolResult, ResourceKey};

/// Builds brand-new entities for a pool.
///
/// Only called when the pool's stock has nothing for the requested key.
/// The returned entity is parented, keyed and set up by the pool afterwards.
///
/// # Example
///
/// ```rust,ignore
/// struct BulletFactory { assets: AssetLoader }
///
/// impl EntityFactory for BulletFactory {
///     type Entity = Bullet;
///
///     async fn construct(&self, key: &ResourceKey) -> PoolResult<Bullet> {
///         let mesh = self.assets.load(key.as_str()).await?;
///         Ok(Bullet::new(mesh))
///     }
/// }
/// ```
pub trait EntityFactory: 'static {
    /// The entity type this factory builds.
    type Entity: Entity + 'static;

    /// Builds a new entity from the recipe named by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Construction`](stockpile_core::PoolError::Construction)
    /// if the resource cannot be built.
    fn construct(&self, key: &ResourceKey) -> impl Future<Output = PoolResult<Self::Entity>>;
}
