//! # Entity Contract
//!
//! Pooled entities are opaque to the storage beyond a small lifecycle:
//! - `setup` every time the entity becomes active (including reuse)
//! - phase hooks while it sits in the active set
//! - `cleanup` exactly once per retirement
//! - `destroy` + `release` when it is not recycled
//!
//! The storage identifies entities by [`EntityId`] and groups retired ones
//! by [`ResourceKey`].

use std::borrow::Borrow;
use std::fmt;

/// Pool-unique identifier for a pooled entity.
///
/// Ids are issued by the owning pool and survive recycling: an entity popped
/// from stock keeps the id it had before retirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates an entity ID from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the construction recipe that produced an entity.
///
/// The empty key marks entities that are never recycled.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Creates a key from a recipe name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The sentinel key for entities that are not eligible for recycling.
    #[must_use]
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// Returns the recipe name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether entities with this key may ever be stocked.
    #[inline]
    #[must_use]
    pub fn is_recyclable(&self) -> bool {
        !self.0.is_empty()
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ResourceKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Handle to a node in the host's container hierarchy.
///
/// Pools parent every entity they construct under their own container so the
/// host can scope lifetime and visibility per pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ContainerId(u32);

impl ContainerId {
    /// Creates a container id from a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Lifecycle contract every pooled object satisfies.
///
/// All hooks except the activation pair have empty defaults. `destroy` tears
/// down entity-level state; `release` frees the underlying heavyweight
/// resource and always runs right after it.
pub trait Entity {
    /// Sets the activation flag of the underlying resource.
    fn set_active(&mut self, active: bool);

    /// Returns the activation flag of the underlying resource.
    fn is_active(&self) -> bool;

    /// Whether the entity should stay in the active set.
    ///
    /// Checked after every `late_execute`. Defaults to [`Entity::is_active`],
    /// so deactivating an entity retires it at the end of the cycle.
    fn is_exist(&self) -> bool {
        self.is_active()
    }

    /// Parents the underlying resource under a host container.
    fn set_parent(&mut self, _container: ContainerId) {}

    /// Re-initialization run every time the entity becomes active.
    fn setup(&mut self) {}

    /// Teardown run once per retirement, whether recycled or destroyed.
    fn cleanup(&mut self) {}

    /// Main update phase.
    fn execute(&mut self) {}

    /// Animation/playable update phase.
    fn evaluate(&mut self) {}

    /// Post-update phase, followed by the existence check.
    fn late_execute(&mut self) {}

    /// Fixed-step (physics) update phase.
    fn fixed_execute(&mut self) {}

    /// Entity-level destruction before the resource is released.
    fn destroy(&mut self) {}

    /// Releases the underlying heavyweight resource.
    fn release(&mut self) {}
}

/// An entity together with the bookkeeping the storage needs.
#[derive(Debug)]
pub struct PooledEntity<E> {
    pub(crate) id: EntityId,
    pub(crate) key: ResourceKey,
    pub(crate) entity: E,
}

impl<E> PooledEntity<E> {
    /// Wraps an entity built from `key`.
    #[must_use]
    pub fn new(id: EntityId, key: ResourceKey, entity: E) -> Self {
        Self { id, key, entity }
    }

    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the construction key.
    #[inline]
    #[must_use]
    pub fn resource_key(&self) -> &ResourceKey {
        &self.key
    }

    /// Returns the wrapped entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Returns the wrapped entity mutably.
    #[inline]
    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_null() {
        assert!(EntityId::NULL.is_null());
        assert!(EntityId::default().is_null());
        assert!(!EntityId::new(0).is_null());
        assert_eq!(EntityId::new(42).raw(), 42);
    }

    #[test]
    fn test_resource_key_recyclable() {
        assert!(!ResourceKey::none().is_recyclable());
        assert!(!ResourceKey::default().is_recyclable());
        assert!(ResourceKey::from("fx/spark").is_recyclable());
        assert_eq!(ResourceKey::none().to_string(), "<none>");
        assert_eq!(ResourceKey::new("fx/spark").to_string(), "fx/spark");
    }

    #[test]
    fn test_pooled_entity_accessors() {
        let mut pooled = PooledEntity::new(EntityId::new(7), "a".into(), 10_u32);
        assert_eq!(pooled.id(), EntityId::new(7));
        assert_eq!(pooled.resource_key().as_str(), "a");
        *pooled.entity_mut() += 1;
        assert_eq!(*pooled.entity(), 11);
    }
}
