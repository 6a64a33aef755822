// Agent identities and the two species

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable agent identity. Identities are handed out in increasing order
/// and never reused, so ordering by id is creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Human,
    Zombie,
}

/// Which occupancy extreme a scan is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// A fleeing agent. Energy is spent one unit per successful escape and
/// fully restored after one activation spent standing still.
#[derive(Clone, Debug, PartialEq)]
pub struct Human {
    pub id: AgentId,
    pub energy: u32,
    pub starting_energy: u32,
}

impl Human {
    pub fn new(id: AgentId, starting_energy: u32) -> Self {
        Self {
            id,
            energy: starting_energy,
            starting_energy,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.energy == 0
    }

    /// Restore full stamina (an activation spent recovering).
    pub fn recover(&mut self) {
        self.energy = self.starting_energy;
    }
}

/// A pursuing agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Zombie {
    pub id: AgentId,
    // One-shot move notification, consumed by `take_just_moved`
    just_moved: bool,
}

impl Zombie {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            just_moved: false,
        }
    }

    /// Read and clear the move notification.
    pub fn take_just_moved(&mut self) -> bool {
        std::mem::take(&mut self.just_moved)
    }

    pub fn just_moved(&self) -> bool {
        self.just_moved
    }
}

/// Per-species capabilities used by the step logic.
pub trait Actor {
    fn id(&self) -> AgentId;

    fn species(&self) -> Species;

    /// Species whose occupancy this actor scans for, and which extreme it seeks.
    fn scan_target(&self) -> (Species, Extremum);

    /// Bookkeeping after a move that actually changed cells.
    fn on_moved(&mut self);
}

impl Actor for Human {
    fn id(&self) -> AgentId {
        self.id
    }

    fn species(&self) -> Species {
        Species::Human
    }

    fn scan_target(&self) -> (Species, Extremum) {
        (Species::Zombie, Extremum::Min)
    }

    fn on_moved(&mut self) {
        self.energy = self.energy.saturating_sub(1);
    }
}

impl Actor for Zombie {
    fn id(&self) -> AgentId {
        self.id
    }

    fn species(&self) -> Species {
        Species::Zombie
    }

    fn scan_target(&self) -> (Species, Extremum) {
        (Species::Human, Extremum::Max)
    }

    fn on_moved(&mut self) {
        self.just_moved = true;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Agent {
    Human(Human),
    Zombie(Zombie),
}

impl Agent {
    pub fn as_actor(&self) -> &dyn Actor {
        match self {
            Agent::Human(h) => h,
            Agent::Zombie(z) => z,
        }
    }

    pub fn id(&self) -> AgentId {
        self.as_actor().id()
    }

    pub fn species(&self) -> Species {
        self.as_actor().species()
    }

    pub fn as_human(&self) -> Option<&Human> {
        match self {
            Agent::Human(h) => Some(h),
            Agent::Zombie(_) => None,
        }
    }

    pub fn as_human_mut(&mut self) -> Option<&mut Human> {
        match self {
            Agent::Human(h) => Some(h),
            Agent::Zombie(_) => None,
        }
    }

    pub fn as_zombie_mut(&mut self) -> Option<&mut Zombie> {
        match self {
            Agent::Zombie(z) => Some(z),
            Agent::Human(_) => None,
        }
    }
}
