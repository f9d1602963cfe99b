//! Shared test entities and factories.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use stockpile::{ContainerId, Entity, EntityFactory, PoolError, PoolResult, ResourceKey};

/// Lifecycle hooks recorded by [`Probe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Setup,
    Cleanup,
    Execute,
    Evaluate,
    LateExecute,
    FixedExecute,
    Destroy,
    Release,
}

/// Hook log shared between a factory and everything it built.
#[derive(Clone, Default)]
pub struct Journal {
    events: Rc<RefCell<Vec<(u64, Hook)>>>,
}

impl Journal {
    pub fn record(&self, serial: u64, hook: Hook) {
        self.events.borrow_mut().push((serial, hook));
    }

    /// Calls of `hook` on the entity built as `serial`.
    pub fn count(&self, serial: u64, hook: Hook) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|&&(s, h)| s == serial && h == hook)
            .count()
    }

    /// Calls of `hook` across all entities.
    pub fn total(&self, hook: Hook) -> usize {
        self.events.borrow().iter().filter(|&&(_, h)| h == hook).count()
    }
}

/// Entity standing in for a heavyweight scene object.
pub struct Probe {
    /// Construction serial, unique per factory and kept across reuse.
    pub serial: u64,
    pub key: ResourceKey,
    pub active: bool,
    /// Turned off to make the entity report non-existence.
    pub alive: bool,
    pub parent: Option<ContainerId>,
    journal: Journal,
}

impl Entity for Probe {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_exist(&self) -> bool {
        self.alive
    }

    fn set_parent(&mut self, container: ContainerId) {
        self.parent = Some(container);
    }

    fn setup(&mut self) {
        self.alive = true;
        self.journal.record(self.serial, Hook::Setup);
    }

    fn cleanup(&mut self) {
        self.journal.record(self.serial, Hook::Cleanup);
    }

    fn execute(&mut self) {
        self.journal.record(self.serial, Hook::Execute);
    }

    fn evaluate(&mut self) {
        self.journal.record(self.serial, Hook::Evaluate);
    }

    fn late_execute(&mut self) {
        self.journal.record(self.serial, Hook::LateExecute);
    }

    fn fixed_execute(&mut self) {
        self.journal.record(self.serial, Hook::FixedExecute);
    }

    fn destroy(&mut self) {
        self.journal.record(self.serial, Hook::Destroy);
    }

    fn release(&mut self) {
        self.journal.record(self.serial, Hook::Release);
    }
}

/// Builds [`Probe`]s, yielding once per construction like a real asset load.
///
/// Keys starting with `broken/` fail.
#[derive(Clone, Default)]
pub struct ProbeFactory {
    pub journal: Journal,
    built: Rc<Cell<u64>>,
}

impl ProbeFactory {
    /// Number of entities constructed so far.
    pub fn built(&self) -> u64 {
        self.built.get()
    }
}

impl EntityFactory for ProbeFactory {
    type Entity = Probe;

    async fn construct(&self, key: &ResourceKey) -> PoolResult<Probe> {
        tokio::task::yield_now().await;

        if key.as_str().starts_with("broken/") {
            return Err(PoolError::Construction {
                key: key.to_string(),
                reason: "asset missing".to_string(),
            });
        }

        let serial = self.built.get();
        self.built.set(serial + 1);
        Ok(Probe {
            serial,
            key: key.clone(),
            active: true,
            alive: true,
            parent: None,
            journal: self.journal.clone(),
        })
    }
}
