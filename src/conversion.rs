// Conversion: a zombie turns one human sharing its cell into a new zombie

use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

use crate::agent::{AgentId, Species};
use crate::error::{SimError, SimResult};
use crate::population::Population;
use crate::space::SpatialIndex;
use crate::trigger::WatchRegistry;

/// One infection: `source` converted a human into the zombie `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionEdge {
    pub source: AgentId,
    pub target: AgentId,
}

/// Append-only record of who converted whom.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InfectionNetwork {
    edges: Vec<ConversionEdge>,
}

impl InfectionNetwork {
    pub fn add_edge(&mut self, source: AgentId, target: AgentId) -> ConversionEdge {
        let edge = ConversionEdge { source, target };
        self.edges.push(edge);
        edge
    }

    pub fn edges(&self) -> &[ConversionEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of conversions made by `source`.
    pub fn out_degree(&self, source: AgentId) -> usize {
        self.edges.iter().filter(|e| e.source == source).count()
    }

    /// Converter with the most conversions; ties go to the lower id.
    pub fn top_converter(&self) -> Option<(AgentId, usize)> {
        let mut counts: HashMap<AgentId, usize> = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge.source).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by(|(a_id, a_n), (b_id, b_n)| a_n.cmp(b_n).then(b_id.cmp(a_id)))
    }
}

/// Let `converter` infect one human in its current cell.
///
/// The occupant list is snapshotted before anything is removed. The victim
/// is drawn uniformly from it, destroyed, and replaced by a new zombie placed
/// at the converter's own position. Returns the recorded edge, or `None`
/// when the cell holds no humans.
pub fn attempt_conversion<S, R>(
    population: &mut Population,
    space: &mut S,
    watchers: &mut WatchRegistry,
    converter: AgentId,
    rng: &mut R,
) -> SimResult<Option<ConversionEdge>>
where
    S: SpatialIndex + ?Sized,
    R: Rng + ?Sized,
{
    let cell = space.current_cell(converter)?;
    let occupants = space.occupants_at(cell, Species::Human);
    if occupants.is_empty() {
        return Ok(None);
    }

    let victim = occupants[rng.gen_range(0..occupants.len())];
    let victim_point = space.current_position(victim)?;
    population.remove(victim).ok_or(SimError::NotHuman(victim))?;
    space.remove(victim)?;
    watchers.unregister(victim);

    let at = space.current_position(converter)?;
    let zombie = population.spawn_zombie();
    space.place(zombie, Species::Zombie, at);
    let edge = population.network.add_edge(converter, zombie);

    tracing::debug!(
        converter = %converter,
        victim = %victim,
        new_zombie = %zombie,
        victim_x = victim_point.x,
        victim_y = victim_point.y,
        cell_x = cell.x,
        cell_y = cell.y,
        "human converted"
    );
    Ok(Some(edge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BorderPolicy;
    use crate::space::{Cell, GridSpace, Point};
    use crate::trigger::Watch;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        population: Population,
        space: GridSpace,
        watchers: WatchRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                population: Population::new(),
                space: GridSpace::new(10, 10, BorderPolicy::Wrapped),
                watchers: WatchRegistry::new(),
            }
        }

        fn human(&mut self, x: f64, y: f64) -> AgentId {
            let id = self.population.spawn_human(5);
            self.space.place(id, Species::Human, Point::new(x, y));
            self.watchers.register(
                id,
                Watch {
                    radius: 1,
                    species: Species::Zombie,
                },
            );
            id
        }

        fn zombie(&mut self, x: f64, y: f64) -> AgentId {
            let id = self.population.spawn_zombie();
            self.space.place(id, Species::Zombie, Point::new(x, y));
            id
        }

        fn convert(&mut self, converter: AgentId, rng: &mut ChaCha8Rng) -> Option<ConversionEdge> {
            attempt_conversion(
                &mut self.population,
                &mut self.space,
                &mut self.watchers,
                converter,
                rng,
            )
            .unwrap()
        }
    }

    #[test]
    fn empty_cell_converts_nobody() {
        let mut fx = Fixture::new();
        let zombie = fx.zombie(2.5, 2.5);
        fx.human(3.5, 2.5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert_eq!(fx.convert(zombie, &mut rng), None);
        assert_eq!(fx.population.count(Species::Human), 1);
        assert!(fx.population.network.is_empty());
    }

    #[test]
    fn new_zombie_takes_the_converters_position() {
        let mut fx = Fixture::new();
        let attacker = fx.zombie(2.2, 2.3);
        let victim = fx.human(2.9, 2.8);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let edge = fx.convert(attacker, &mut rng).unwrap();
        assert_eq!(edge.source, attacker);
        assert!(!fx.population.is_alive(victim));
        assert!(!fx.watchers.is_registered(victim));
        assert!(fx.space.current_cell(victim).is_err());

        let created = edge.target;
        assert_eq!(fx.space.current_position(created).unwrap(), Point::new(2.2, 2.3));
        assert_eq!(fx.space.current_cell(created).unwrap(), Cell::new(2, 2));
        assert_eq!(fx.population.get(created).map(|a| a.species()), Some(Species::Zombie));
    }

    #[test]
    fn one_conversion_per_call_however_crowded() {
        let mut fx = Fixture::new();
        let attacker = fx.zombie(5.5, 5.5);
        let humans: Vec<_> = (0..4).map(|i| fx.human(5.1 + 0.2 * i as f64, 5.5)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let before_zombies = fx.population.count(Species::Zombie);
        let edge = fx.convert(attacker, &mut rng).unwrap();
        assert_eq!(fx.population.count(Species::Human), 3);
        assert_eq!(fx.population.count(Species::Zombie), before_zombies + 1);
        assert_eq!(fx.population.network.edges(), &[edge]);
        assert_eq!(
            humans.iter().filter(|&&h| fx.population.is_alive(h)).count(),
            3
        );
    }

    #[test]
    fn victims_are_drawn_from_every_occupant() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..60 {
            let mut fx = Fixture::new();
            let attacker = fx.zombie(1.5, 1.5);
            let humans = [fx.human(1.1, 1.1), fx.human(1.4, 1.9), fx.human(1.8, 1.2)];
            fx.convert(attacker, &mut rng).unwrap();
            let position = humans
                .iter()
                .position(|&h| !fx.population.is_alive(h))
                .unwrap();
            seen.insert(position);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn network_tracks_prolific_converters() {
        let mut network = InfectionNetwork::default();
        network.add_edge(AgentId(1), AgentId(10));
        network.add_edge(AgentId(2), AgentId(11));
        network.add_edge(AgentId(2), AgentId(12));
        network.add_edge(AgentId(1), AgentId(13));
        network.add_edge(AgentId(1), AgentId(14));

        assert_eq!(network.len(), 5);
        assert_eq!(network.out_degree(AgentId(2)), 2);
        assert_eq!(network.top_converter(), Some((AgentId(1), 3)));
        assert_eq!(InfectionNetwork::default().top_converter(), None);
    }
}
