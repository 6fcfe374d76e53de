//! Boid flocking: agents steered by cohesion, alignment, separation and
//! wander inside a reflecting box.

pub mod agent;
pub mod creature;
pub mod flock;
pub mod params;
pub mod spatial_grid;
pub mod steering;

pub use agent::Agent;
pub use creature::{creature_mesh, WingFlap, CREATURE_COLOR};
pub use flock::Flock;
pub use params::{FlockParams, NEIGHBOR_RADIUS_FACTOR, TURN_RATE};
pub use spatial_grid::SpatialGrid;
