// Live agents of both species plus the infection network

use std::collections::BTreeMap;

use crate::agent::{Agent, AgentId, Human, Species, Zombie};
use crate::conversion::InfectionNetwork;

/// Identity -> agent, iterated in ascending id (creation) order.
#[derive(Default)]
pub struct Population {
    agents: BTreeMap<AgentId, Agent>,
    pub network: InfectionNetwork,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> AgentId {
        self.next_id += 1;
        AgentId(self.next_id)
    }

    pub fn spawn_human(&mut self, starting_energy: u32) -> AgentId {
        let id = self.allocate_id();
        self.agents
            .insert(id, Agent::Human(Human::new(id, starting_energy)));
        id
    }

    pub fn spawn_zombie(&mut self) -> AgentId {
        let id = self.allocate_id();
        self.agents.insert(id, Agent::Zombie(Zombie::new(id)));
        id
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn human(&self, id: AgentId) -> Option<&Human> {
        self.agents.get(&id).and_then(Agent::as_human)
    }

    pub fn human_mut(&mut self, id: AgentId) -> Option<&mut Human> {
        self.agents.get_mut(&id).and_then(Agent::as_human_mut)
    }

    pub fn zombie_mut(&mut self, id: AgentId) -> Option<&mut Zombie> {
        self.agents.get_mut(&id).and_then(Agent::as_zombie_mut)
    }

    pub fn is_alive(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn humans(&self) -> impl Iterator<Item = &Human> + '_ {
        self.agents.values().filter_map(Agent::as_human)
    }

    /// Snapshot of live ids of `species`, ascending.
    pub fn ids_of(&self, species: Species) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.species() == species)
            .map(Agent::id)
            .collect()
    }

    pub fn count(&self, species: Species) -> usize {
        self.agents
            .values()
            .filter(|a| a.species() == species)
            .count()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
