//! Storage counters.

/// Running counters kept by an [`EntityStorage`](super::EntityStorage).
///
/// Counters only grow; [`EntityStorage::clear`](super::EntityStorage::clear)
/// does not reset them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Times the active set outgrew its capacity and doubled.
    pub grow_events: u64,
    /// Successful pops from the stock.
    pub stock_hits: u64,
    /// Retirements that went back into the stock.
    pub stocked: u64,
    /// Entities destroyed and released.
    pub destroyed: u64,
    /// Largest active count observed.
    pub peak_active: usize,
}

impl StorageStats {
    /// Fraction of retirements that were recycled rather than destroyed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn recycle_ratio(&self) -> f64 {
        let total = self.stocked + self.destroyed;
        if total == 0 {
            0.0
        } else {
            self.stocked as f64 / total as f64
        }
    }
}
