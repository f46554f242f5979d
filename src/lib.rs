//! # colony_engine
//!
//! The core engine for an ant-colony foraging simulation.
//! Ants leave their colony in search of sugar, haul what they find back
//! home along pheromone-reinforced trails, and starve when the colony's
//! stock runs dry.

pub mod simulator;
pub use simulator::AntState;
pub use simulator::ColonyState;
pub use simulator::SimulationState;
pub use simulator::Simulator;

mod entities;
mod error;
mod graph;
mod replay;
mod rng;

pub use entities::Ant;
pub use entities::Edge;
pub use entities::Node;
pub use entities::NodeId;
pub use entities::Role;
pub use error::GraphError;
pub use error::SimulationError;
pub use graph::Graph;
pub use graph::SugarSpawn;
pub use rng::Sampler;
