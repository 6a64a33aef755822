// Reactive triggers: agents register interest in moves made by another
// species nearby and get re-evaluated synchronously when one happens

use std::collections::BTreeMap;

use crate::agent::{AgentId, Species};
use crate::space::{Cell, SpatialIndex};

/// What a watcher reacts to: moves by `species` ending within `radius` of
/// the watcher's own cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watch {
    pub radius: u32,
    pub species: Species,
}

#[derive(Default)]
pub struct WatchRegistry {
    // Ordered so dispatch is deterministic
    watches: BTreeMap<AgentId, Watch>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, watcher: AgentId, watch: Watch) {
        self.watches.insert(watcher, watch);
    }

    pub fn unregister(&mut self, watcher: AgentId) -> Option<Watch> {
        self.watches.remove(&watcher)
    }

    pub fn is_registered(&self, watcher: AgentId) -> bool {
        self.watches.contains_key(&watcher)
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Watchers to notify for a move by `mover_species` that ended in
    /// `mover_cell`, in ascending id order.
    ///
    /// The result is a snapshot: handlers may move agents or edit the
    /// registry while it is being walked. Watchers missing from the index
    /// are skipped.
    pub fn dispatch<S>(&self, mover_species: Species, mover_cell: Cell, space: &S) -> Vec<AgentId>
    where
        S: SpatialIndex + ?Sized,
    {
        self.watches
            .iter()
            .filter(|(_, watch)| watch.species == mover_species)
            .filter_map(|(&watcher, watch)| {
                let cell = space.current_cell(watcher).ok()?;
                (space.cell_distance(cell, mover_cell) <= u64::from(watch.radius)).then_some(watcher)
            })
            .collect()
    }
}
