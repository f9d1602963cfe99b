//! # Pool Registry
//!
//! Exactly one live pool per pool type, owned by the application's
//! composition root and passed down by reference.
//!
//! ```rust,ignore
//! let mut registry = PoolRegistry::new();
//! registry.create_instance(bullet_pool);
//!
//! loop {
//!     registry.tick();
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use tracing::info;

/// Object-safe surface of a pool, as driven by the registry.
pub trait Assembly: Any {
    /// Pool name.
    fn name(&self) -> &str;
    /// Destroys every entity the pool holds.
    fn cleanup(&mut self);
    /// Commits queued entities.
    fn flush(&mut self);
    /// Main update phase.
    fn execute(&mut self);
    /// Evaluate phase.
    fn evaluate(&mut self);
    /// Late phase, retiring entities that no longer exist.
    fn late_execute(&mut self);
    /// Fixed-step phase.
    fn fixed_execute(&mut self);
    /// Resumes the update phases.
    fn enable(&mut self);
    /// Skips the update phases until re-enabled.
    fn disable(&mut self);
    /// Whether the update phases run.
    fn is_enabled(&self) -> bool;
    /// Upcast for typed lookup.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for typed lookup.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// One instance per concrete pool type, in registration order.
#[derive(Default)]
pub struct PoolRegistry {
    pools: Vec<(TypeId, Box<dyn Assembly>)>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns true if no pool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Whether an instance of `P` is registered.
    #[must_use]
    pub fn contains<P: Assembly>(&self) -> bool {
        self.position::<P>().is_some()
    }

    /// Names of the registered pools, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.iter().map(|(_, pool)| pool.name())
    }

    /// Registers the single instance of `P`.
    ///
    /// # Panics
    ///
    /// Panics if an instance of `P` already exists. Creating a pool twice is
    /// a programming error.
    pub fn create_instance<P: Assembly>(&mut self, pool: P) {
        assert!(
            !self.contains::<P>(),
            "pool instance already created: {}",
            type_name::<P>()
        );

        info!(pool = pool.name(), "pool instance created");
        self.pools.push((TypeId::of::<P>(), Box::new(pool)));
    }

    /// Cleans up and drops the instance of `P`.
    ///
    /// Returns false if there was none.
    pub fn destroy_instance<P: Assembly>(&mut self) -> bool {
        let Some(index) = self.position::<P>() else {
            return false;
        };

        let (_, mut pool) = self.pools.remove(index);
        pool.cleanup();
        info!(pool = pool.name(), "pool instance destroyed");
        true
    }

    /// The instance of `P`, if registered.
    #[must_use]
    pub fn instance<P: Assembly>(&self) -> Option<&P> {
        let index = self.position::<P>()?;
        self.pools[index].1.as_any().downcast_ref::<P>()
    }

    /// The instance of `P`, mutably, if registered.
    pub fn instance_mut<P: Assembly>(&mut self) -> Option<&mut P> {
        let index = self.position::<P>()?;
        self.pools[index].1.as_any_mut().downcast_mut::<P>()
    }

    /// Runs one update cycle on every pool.
    ///
    /// Each phase completes across all pools before the next one starts:
    /// `flush`, `execute`, `evaluate`, `late_execute`.
    pub fn tick(&mut self) {
        for (_, pool) in &mut self.pools {
            pool.flush();
        }
        for (_, pool) in &mut self.pools {
            pool.execute();
        }
        for (_, pool) in &mut self.pools {
            pool.evaluate();
        }
        for (_, pool) in &mut self.pools {
            pool.late_execute();
        }
    }

    /// Runs the fixed-step phase on every pool.
    pub fn fixed_tick(&mut self) {
        for (_, pool) in &mut self.pools {
            pool.fixed_execute();
        }
    }

    /// Cleans up and drops every pool, most recently registered first.
    pub fn cleanup_all(&mut self) {
        while let Some((_, mut pool)) = self.pools.pop() {
            pool.cleanup();
            info!(pool = pool.name(), "pool instance destroyed");
        }
    }

    fn position<P: Assembly>(&self) -> Option<usize> {
        let type_id = TypeId::of::<P>();
        self.pools.iter().position(|(id, _)| *id == type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<String>>>;

    /// Records phase calls as `name:phase`.
    struct Recorder<const N: usize> {
        enabled: bool,
        calls: Calls,
    }

    impl<const N: usize> Recorder<N> {
        fn new(calls: &Calls) -> Self {
            Self {
                enabled: true,
                calls: Rc::clone(calls),
            }
        }

        fn record(&self, phase: &str) {
            self.calls.borrow_mut().push(format!("{}:{phase}", self.name()));
        }
    }

    impl<const N: usize> Assembly for Recorder<N> {
        fn name(&self) -> &str {
            if N == 0 {
                "first"
            } else {
                "second"
            }
        }

        fn cleanup(&mut self) {
            self.record("cleanup");
        }

        fn flush(&mut self) {
            self.record("flush");
        }

        fn execute(&mut self) {
            self.record("execute");
        }

        fn evaluate(&mut self) {
            self.record("evaluate");
        }

        fn late_execute(&mut self) {
            self.record("late");
        }

        fn fixed_execute(&mut self) {
            self.record("fixed");
        }

        fn enable(&mut self) {
            self.enabled = true;
        }

        fn disable(&mut self) {
            self.enabled = false;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let calls = Calls::default();
        let mut registry = PoolRegistry::new();
        assert!(registry.is_empty());

        registry.create_instance(Recorder::<0>::new(&calls));
        assert!(registry.contains::<Recorder<0>>());
        assert!(!registry.contains::<Recorder<1>>());
        assert_eq!(registry.instance::<Recorder<0>>().unwrap().name(), "first");

        registry.instance_mut::<Recorder<0>>().unwrap().disable();
        assert!(!registry.instance::<Recorder<0>>().unwrap().is_enabled());
        assert!(registry.instance::<Recorder<1>>().is_none());
    }

    #[test]
    #[should_panic(expected = "pool instance already created")]
    fn test_duplicate_instance_panics() {
        let calls = Calls::default();
        let mut registry = PoolRegistry::new();
        registry.create_instance(Recorder::<0>::new(&calls));
        registry.create_instance(Recorder::<0>::new(&calls));
    }

    #[test]
    fn test_tick_runs_phases_across_pools() {
        let calls = Calls::default();
        let mut registry = PoolRegistry::new();
        registry.create_instance(Recorder::<0>::new(&calls));
        registry.create_instance(Recorder::<1>::new(&calls));

        registry.tick();
        registry.fixed_tick();

        assert_eq!(
            *calls.borrow(),
            vec![
                "first:flush",
                "second:flush",
                "first:execute",
                "second:execute",
                "first:evaluate",
                "second:evaluate",
                "first:late",
                "second:late",
                "first:fixed",
                "second:fixed",
            ]
        );
    }

    #[test]
    fn test_destroy_instance() {
        let calls = Calls::default();
        let mut registry = PoolRegistry::new();
        registry.create_instance(Recorder::<0>::new(&calls));

        assert!(registry.destroy_instance::<Recorder<0>>());
        assert!(!registry.destroy_instance::<Recorder<0>>());
        assert_eq!(*calls.borrow(), vec!["first:cleanup"]);

        // The slot is free again.
        registry.create_instance(Recorder::<0>::new(&calls));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cleanup_all_in_reverse_order() {
        let calls = Calls::default();
        let mut registry = PoolRegistry::new();
        registry.create_instance(Recorder::<0>::new(&calls));
        registry.create_instance(Recorder::<1>::new(&calls));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["first", "second"]);

        registry.cleanup_all();
        assert!(registry.is_empty());
        assert_eq!(*calls.borrow(), vec!["second:cleanup", "first:cleanup"]);
    }
}
