use rand::seq::SliceRandom;
use rand::Rng;

use crate::agent::{Actor, AgentId, Species};
use crate::config::SimulationConfig;
use crate::conversion::{attempt_conversion, ConversionEdge};
use crate::error::{SimError, SimResult};
use crate::movement::move_toward;
use crate::population::Population;
use crate::scanner::scan;
use crate::space::{GridSpace, Point, SpatialIndex};
use crate::stats::{RunSummary, TickStats};
use crate::trigger::{Watch, WatchRegistry};

// Simulation state - contains all mutable state data
pub struct SimulationState {
    pub population: Population,
    pub space: GridSpace,
    pub watchers: WatchRegistry,
    pub tick: u64,
    pub history: Vec<TickStats>,
    conversions_at_tick_start: usize,
}

impl SimulationState {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            population: Population::new(),
            space: GridSpace::new(config.grid_width, config.grid_height, config.border),
            watchers: WatchRegistry::new(),
            tick: 0,
            history: Vec::new(),
            conversions_at_tick_start: 0,
        }
    }

    pub fn spawn_human_at(
        &mut self,
        config: &SimulationConfig,
        point: Point,
        energy: u32,
    ) -> SimResult<AgentId> {
        if energy == 0 {
            return Err(SimError::ZeroStartingEnergy);
        }
        let id = self.population.spawn_human(energy);
        self.space.place(id, Species::Human, point);
        self.watchers.register(
            id,
            Watch {
                radius: config.watch_radius,
                species: Species::Zombie,
            },
        );
        Ok(id)
    }

    pub fn spawn_zombie_at(&mut self, point: Point) -> AgentId {
        let id = self.population.spawn_zombie();
        self.space.place(id, Species::Zombie, point);
        id
    }

    /// A human's activation, run whenever a zombie moves close to it.
    ///
    /// An exhausted human spends the activation recovering: no scan, no
    /// move, energy back to full. Otherwise it steps toward the nearby cell
    /// with the fewest zombies. Returns whether it moved.
    pub fn react<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        id: AgentId,
        rng: &mut R,
    ) -> SimResult<bool> {
        let human = self
            .population
            .human_mut(id)
            .ok_or(SimError::NotHuman(id))?;
        if human.is_exhausted() {
            human.recover();
            tracing::trace!(human = %id, energy = human.energy, "recovered");
            return Ok(false);
        }

        let (species, extremum) = human.scan_target();
        let here = self.space.current_cell(id)?;
        let Some(target) = scan(&self.space, here, config.sense_radius, species, extremum, rng)
        else {
            return Ok(false);
        };
        let moved = move_toward(&mut self.space, id, target, config.human_step_length)?;
        if moved {
            human.on_moved();
        }
        Ok(moved)
    }

    /// One zombie's scheduled step: chase the busiest nearby human cell,
    /// let the humans around the new cell react, then try to convert.
    pub fn zombie_step<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        id: AgentId,
        rng: &mut R,
    ) -> SimResult<Option<ConversionEdge>> {
        let zombie = self
            .population
            .zombie_mut(id)
            .ok_or(SimError::NotZombie(id))?;
        let (species, extremum) = zombie.scan_target();
        let here = self.space.current_cell(id)?;
        if let Some(target) = scan(&self.space, here, config.sense_radius, species, extremum, rng) {
            if move_toward(&mut self.space, id, target, config.zombie_step_length)? {
                zombie.on_moved();
            }
        }

        if zombie.take_just_moved() {
            let new_cell = self.space.current_cell(id)?;
            let triggered = self.watchers.dispatch(Species::Zombie, new_cell, &self.space);
            tracing::trace!(zombie = %id, reacting = triggered.len(), "zombie moved");
            for human in triggered {
                self.react(config, human, rng)?;
            }
        }

        attempt_conversion(
            &mut self.population,
            &mut self.space,
            &mut self.watchers,
            id,
            rng,
        )
    }

    pub fn stats(&self) -> TickStats {
        let mut humans = 0;
        let mut total_energy = 0u64;
        let mut exhausted_humans = 0;
        for h in self.population.humans() {
            humans += 1;
            total_energy += u64::from(h.energy);
            if h.is_exhausted() {
                exhausted_humans += 1;
            }
        }
        let mean_human_energy = if humans > 0 {
            total_energy as f64 / humans as f64
        } else {
            0.0
        };
        let total_conversions = self.population.network.len();
        TickStats {
            tick: self.tick,
            humans,
            zombies: self.population.count(Species::Zombie),
            conversions_this_tick: total_conversions - self.conversions_at_tick_start,
            total_conversions,
            mean_human_energy,
            exhausted_humans,
        }
    }
}

// Simulation - contains state and config
pub struct Simulation {
    pub state: SimulationState,
    pub config: SimulationConfig,
}

// Implement Deref for convenience - allows sim.population instead of sim.state.population
impl std::ops::Deref for Simulation {
    type Target = SimulationState;
    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl std::ops::DerefMut for Simulation {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl Simulation {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> SimResult<Self> {
        Self::with_config(rng, SimulationConfig::default())
    }

    /// Validated config with the initial population scattered at random.
    pub fn with_config<R: Rng + ?Sized>(rng: &mut R, config: SimulationConfig) -> SimResult<Self> {
        let mut sim = Self::empty(config)?;
        sim.populate(rng)?;
        Ok(sim)
    }

    /// Validated config and an empty grid, for hand-placed scenarios.
    pub fn empty(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            state: SimulationState::new(&config),
            config,
        })
    }

    fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.gen_range(0.0..self.config.grid_width as f64),
            rng.gen_range(0.0..self.config.grid_height as f64),
        )
    }

    fn populate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<()> {
        for _ in 0..self.config.zombie_count {
            let point = self.random_point(rng);
            self.state.spawn_zombie_at(point);
        }
        for _ in 0..self.config.human_count {
            let point = self.random_point(rng);
            let energy = rng.gen_range(self.config.human_energy_min..=self.config.human_energy_max);
            self.state.spawn_human_at(&self.config, point, energy)?;
        }
        tracing::debug!(
            humans = self.config.human_count,
            zombies = self.config.zombie_count,
            "population placed"
        );
        Ok(())
    }

    /// Place a human with `energy` as both its current and starting energy.
    /// Fails with [`SimError::ZeroStartingEnergy`] for an energy of 0.
    pub fn spawn_human_at(&mut self, point: Point, energy: u32) -> SimResult<AgentId> {
        self.state.spawn_human_at(&self.config, point, energy)
    }

    pub fn spawn_zombie_at(&mut self, point: Point) -> AgentId {
        self.state.spawn_zombie_at(point)
    }

    pub fn react<R: Rng + ?Sized>(&mut self, id: AgentId, rng: &mut R) -> SimResult<bool> {
        self.state.react(&self.config, id, rng)
    }

    pub fn zombie_step<R: Rng + ?Sized>(
        &mut self,
        id: AgentId,
        rng: &mut R,
    ) -> SimResult<Option<ConversionEdge>> {
        self.state.zombie_step(&self.config, id, rng)
    }

    /// Run one tick: every zombie alive at the start of the tick takes its
    /// step, in id order unless activation shuffling is enabled. Zombies
    /// created during the tick first act on the next one.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<TickStats> {
        self.state.tick += 1;
        self.state.conversions_at_tick_start = self.state.population.network.len();

        let mut zombies = self.state.population.ids_of(Species::Zombie);
        if self.config.shuffle_activation_order {
            zombies.shuffle(rng);
        }
        for id in zombies {
            self.state.zombie_step(&self.config, id, rng)?;
        }

        let stats = self.state.stats();
        tracing::debug!(
            tick = stats.tick,
            humans = stats.humans,
            zombies = stats.zombies,
            conversions = stats.conversions_this_tick,
            "tick complete"
        );
        self.state.history.push(stats.clone());
        Ok(stats)
    }

    pub fn is_extinct(&self) -> bool {
        self.state.population.count(Species::Human) == 0
    }

    /// Step until `max_ticks`, or until the humans are gone when
    /// `stop_when_extinct` is set.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<RunSummary> {
        while self.state.tick < self.config.max_ticks {
            if self.config.stop_when_extinct && self.is_extinct() {
                break;
            }
            self.step(rng)?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        let extinction_tick = self
            .state
            .history
            .iter()
            .find(|s| s.humans == 0)
            .map(|s| s.tick);
        RunSummary {
            seed: self.config.seed,
            ticks_run: self.state.tick,
            final_stats: self.state.stats(),
            extinction_tick,
            top_converter: self.state.population.network.top_converter(),
        }
    }

    pub fn stats(&self) -> TickStats {
        self.state.stats()
    }

    /// Throw away every agent and edge and scatter a fresh population.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<()> {
        self.state = SimulationState::new(&self.config);
        self.populate(rng)
    }
}
