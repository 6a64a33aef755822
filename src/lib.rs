//! Grid outbreak simulation: humans flee local concentrations of zombies,
//! zombies chase humans and convert them on contact.
//!
//! Zombies act once per tick. Humans never act on a schedule; each zombie
//! move synchronously re-evaluates the humans within the watch radius of
//! the zombie's new cell before that zombie tries to convert anyone.

pub mod agent;
pub mod config;
pub mod conversion;
pub mod ensemble;
pub mod error;
pub mod movement;
pub mod population;
pub mod scanner;
pub mod simulation;
pub mod space;
pub mod stats;
pub mod trigger;

pub use agent::{Agent, AgentId, Species};
pub use config::{BorderPolicy, SimulationConfig};
pub use conversion::{ConversionEdge, InfectionNetwork};
pub use error::{ConfigError, SimError, SimResult};
pub use simulation::Simulation;
pub use space::{Cell, GridSpace, Point, SpatialIndex};
pub use stats::{EnsembleStats, RunSummary, TickStats};
