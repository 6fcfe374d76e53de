use serde::{Deserialize, Serialize};
use thicket_core::error::{ensure_finite, ensure_positive};
use thicket_core::ConfigError;

/// Neighbour radius as a fraction of the world box half-width
pub const NEIGHBOR_RADIUS_FACTOR: f32 = 0.2;

/// Rotation slerp rate toward the velocity heading, per second
pub const TURN_RATE: f32 = 5.0;

/// Flock settings. Everything here can be changed between ticks through
/// [`Flock::set_params`](crate::Flock::set_params).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub seed: u64,
    pub agent_count: usize,
    /// Half-width of the cube the agents are kept in
    pub world_box_size: f32,
    pub max_velocity: f32,
    pub min_velocity: f32,

    pub cohesion_enabled: bool,
    pub cohesion_strength: f32,
    pub alignment_enabled: bool,
    pub alignment_strength: f32,
    pub separation_enabled: bool,
    pub separation_strength: f32,
    pub wander_enabled: bool,
    pub wander_strength: f32,

    pub show_trails: bool,
    pub max_trail_length: usize,

    /// Answer neighbour queries from a uniform grid instead of scanning every agent
    pub use_spatial_grid: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            seed: 0,
            agent_count: 20,
            world_box_size: 10.0,
            max_velocity: 5.0,
            min_velocity: 1.0,
            cohesion_enabled: true,
            cohesion_strength: 1.0,
            alignment_enabled: true,
            alignment_strength: 1.0,
            separation_enabled: true,
            separation_strength: 1.0,
            wander_enabled: true,
            wander_strength: 1.0,
            show_trails: false,
            max_trail_length: 10,
            use_spatial_grid: true,
        }
    }
}

impl FlockParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("world box size", self.world_box_size)?;
        ensure_finite("max velocity", self.max_velocity)?;
        ensure_finite("min velocity", self.min_velocity)?;
        if self.min_velocity < 0.0 {
            return Err(ConfigError::InvalidDimension { what: "min velocity", got: self.min_velocity });
        }
        if self.min_velocity > self.max_velocity {
            return Err(ConfigError::VelocityRange { min: self.min_velocity, max: self.max_velocity });
        }

        ensure_finite("cohesion strength", self.cohesion_strength)?;
        ensure_finite("alignment strength", self.alignment_strength)?;
        ensure_finite("separation strength", self.separation_strength)?;
        ensure_finite("wander strength", self.wander_strength)?;

        if self.show_trails && self.max_trail_length == 0 {
            return Err(ConfigError::InvalidCount { what: "max trail length", min: 1, got: 0 });
        }
        Ok(())
    }

    pub fn neighbor_radius(&self) -> f32 {
        self.world_box_size * NEIGHBOR_RADIUS_FACTOR
    }

    /// Every steering rule switched off except wander
    pub fn wander_only(mut self) -> Self {
        self.cohesion_enabled = false;
        self.alignment_enabled = false;
        self.separation_enabled = false;
        self.wander_enabled = true;
        self
    }
}
