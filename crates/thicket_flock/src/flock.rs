use glam::{Mat4, Quat, Vec3};
use thicket_core::math::look_rotation;
use thicket_core::{ConfigError, GenRng, Mesh, SceneSink, WorldSeed};

use crate::agent::Agent;
use crate::creature::{creature_mesh, WingFlap, CREATURE_COLOR};
use crate::params::{FlockParams, TURN_RATE};
use crate::spatial_grid::SpatialGrid;
use crate::steering::{alignment, clamp_speed, cohesion, separation, wander};

/// Grid cells are this much wider than the query radius so a pair exactly
/// one radius apart never lands two cells apart after rounding.
const GRID_MARGIN: f32 = 1.001;

pub struct Flock {
    params: FlockParams,
    agents: Vec<Agent>,
    rng: GenRng,
    grid: SpatialGrid,
    creature: Mesh,
    wing_flap: WingFlap,
    elapsed: f32,
}

impl Flock {
    pub fn new(params: FlockParams) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut flock = Self {
            rng: WorldSeed::new(params.seed).rng(),
            grid: Self::grid_for(&params),
            agents: Vec::with_capacity(params.agent_count),
            creature: creature_mesh(),
            wing_flap: WingFlap::default(),
            elapsed: 0.0,
            params,
        };
        flock.spawn(flock.params.agent_count);

        log::info!(
            "Flock created: {} agents in a box of half-width {}",
            flock.agents.len(),
            flock.params.world_box_size
        );
        Ok(flock)
    }

    fn grid_for(params: &FlockParams) -> SpatialGrid {
        SpatialGrid::new(params.neighbor_radius() * GRID_MARGIN, params.world_box_size)
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Replace the settings between ticks. A changed agent count resizes the
    /// flock; turning trails off drops the stored samples.
    pub fn set_params(&mut self, params: FlockParams) -> Result<(), ConfigError> {
        params.validate()?;

        let count = params.agent_count;
        if params.world_box_size != self.params.world_box_size {
            self.grid = Self::grid_for(&params);
        }
        if !params.show_trails {
            self.agents.iter_mut().for_each(Agent::clear_trail);
        }
        self.params = params;
        if count != self.agents.len() {
            self.resize(count);
        }
        Ok(())
    }

    /// Creation recipe: position inside the world sphere, velocity inside
    /// the max-velocity ball brought into the speed range.
    fn spawn(&mut self, count: usize) {
        let w = self.params.world_box_size;
        for _ in 0..count {
            let position = self.rng.inside_unit_sphere() * w;
            let raw = self.rng.inside_unit_sphere() * self.params.max_velocity;
            let velocity = clamp_speed(raw, self.params.min_velocity, self.params.max_velocity, Vec3::Z);
            let rotation = look_rotation(velocity, Vec3::Y).unwrap_or(Quat::IDENTITY);
            self.agents.push(Agent::new(position, velocity, rotation));
        }
    }

    /// Grow with the creation recipe or drop the highest indices
    pub fn resize(&mut self, count: usize) {
        let current = self.agents.len();
        if count > current {
            self.spawn(count - current);
        } else {
            self.agents.truncate(count);
        }
        self.params.agent_count = count;
        log::info!("Flock resized from {} to {} agents", current, count);
    }

    /// Re-randomize every agent and forget the trails
    pub fn scatter(&mut self) {
        let w = self.params.world_box_size;
        let max = self.params.max_velocity;
        for agent in &mut self.agents {
            agent.position = self.rng.inside_unit_sphere() * w;
            agent.velocity = self.rng.on_unit_sphere() * max;
            agent.rotation = look_rotation(agent.velocity, Vec3::Y).unwrap_or(agent.rotation);
            agent.clear_trail();
        }
        log::info!("Scattered {} agents", self.agents.len());
    }

    /// Indices of every other agent within the neighbour radius of agent
    /// `index`, ascending, by scanning all positions
    pub fn brute_force_neighbors(index: usize, positions: &[Vec3], radius: f32) -> Vec<usize> {
        let center = positions[index];
        let radius_sq = radius * radius;
        positions
            .iter()
            .enumerate()
            .filter(|&(j, p)| j != index && p.distance_squared(center) <= radius_sq)
            .map(|(j, _)| j)
            .collect()
    }

    /// Same set as [`Flock::brute_force_neighbors`], from a grid already
    /// rebuilt over `positions`
    pub fn grid_neighbors(grid: &SpatialGrid, index: usize, positions: &[Vec3], radius: f32) -> Vec<usize> {
        let center = positions[index];
        let radius_sq = radius * radius;
        let mut found: Vec<usize> = grid
            .nearby(center)
            .into_iter()
            .filter(|&j| j != index && positions[j].distance_squared(center) <= radius_sq)
            .collect();
        found.sort_unstable();
        found
    }

    /// Neighbours of agent `index` at the current positions
    pub fn neighbors(&mut self, index: usize) -> Vec<usize> {
        let positions: Vec<Vec3> = self.agents.iter().map(|a| a.position).collect();
        let radius = self.params.neighbor_radius();
        if self.params.use_spatial_grid {
            self.grid.rebuild(&positions);
            Self::grid_neighbors(&self.grid, index, &positions, radius)
        } else {
            Self::brute_force_neighbors(index, &positions, radius)
        }
    }

    /// Advance every agent by `dt` seconds. All agents steer from the
    /// positions and velocities they had when the tick started.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.agents.is_empty() {
            return;
        }

        let positions: Vec<Vec3> = self.agents.iter().map(|a| a.position).collect();
        let velocities: Vec<Vec3> = self.agents.iter().map(|a| a.velocity).collect();
        let radius = self.params.neighbor_radius();
        if self.params.use_spatial_grid {
            self.grid.rebuild(&positions);
        }

        let p = &self.params;
        let w = p.world_box_size;
        let turn = (dt * TURN_RATE).min(1.0);

        for (i, agent) in self.agents.iter_mut().enumerate() {
            let neighbors = if p.use_spatial_grid {
                Self::grid_neighbors(&self.grid, i, &positions, radius)
            } else {
                Self::brute_force_neighbors(i, &positions, radius)
            };

            let position = positions[i];
            let mut velocity = velocities[i];
            if p.cohesion_enabled {
                velocity += cohesion(position, &neighbors, &positions) * p.cohesion_strength;
            }
            if p.alignment_enabled {
                velocity += alignment(&neighbors, &velocities) * p.alignment_strength;
            }
            if p.separation_enabled {
                velocity += separation(position, &neighbors, &positions) * p.separation_strength;
            }
            if p.wander_enabled {
                velocity += wander(&mut self.rng) * p.wander_strength;
            }

            velocity = clamp_speed(velocity, p.min_velocity, p.max_velocity, agent.heading());
            agent.position += velocity * dt;
            if let Some(target) = look_rotation(velocity, Vec3::Y) {
                agent.rotation = agent.rotation.slerp(target, turn).normalize();
            }

            // Reflect off the box walls one axis at a time
            for axis in 0..3 {
                if agent.position[axis] < -w || agent.position[axis] > w {
                    agent.position[axis] = agent.position[axis].clamp(-w, w);
                    velocity[axis] = -velocity[axis];
                }
            }
            agent.velocity = velocity;

            if p.show_trails {
                agent.record_trail(p.max_trail_length);
            }
        }
    }

    /// Creature mesh with the wings posed for the current time
    pub fn posed_creature(&self) -> Mesh {
        self.wing_flap.pose(&self.creature, self.elapsed)
    }

    pub fn emit(&self, sink: &mut dyn SceneSink) {
        let mesh = self.posed_creature();
        for agent in &self.agents {
            let world = Mat4::from_rotation_translation(agent.rotation, agent.position);
            sink.submit("creature", world, &mesh, CREATURE_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::MeshCollector;

    const EPS: f32 = 1e-3;

    fn assert_invariants(flock: &Flock) {
        let p = flock.params();
        for agent in flock.agents() {
            let speed = agent.speed();
            assert!(speed >= p.min_velocity - EPS && speed <= p.max_velocity + EPS, "speed {speed}");
            for axis in 0..3 {
                assert!(agent.position[axis].abs() <= p.world_box_size + EPS);
            }
        }
    }

    #[test]
    fn test_speed_and_box_bounds() {
        let mut flock = Flock::new(FlockParams { agent_count: 40, seed: 3, ..FlockParams::default() }).unwrap();
        assert_invariants(&flock);
        for _ in 0..200 {
            flock.tick(0.05);
            assert_invariants(&flock);
        }
    }

    #[test]
    fn test_large_step_reflects() {
        let mut flock = Flock::new(FlockParams { agent_count: 10, seed: 8, ..FlockParams::default() }).unwrap();
        for _ in 0..20 {
            flock.tick(1.0);
            assert_invariants(&flock);
        }
    }

    #[test]
    fn test_neighbors_symmetric() {
        let flock = Flock::new(FlockParams { agent_count: 60, seed: 11, ..FlockParams::default() }).unwrap();
        let positions: Vec<Vec3> = flock.agents().iter().map(|a| a.position).collect();
        let radius = flock.params().neighbor_radius();

        for i in 0..positions.len() {
            for j in Flock::brute_force_neighbors(i, &positions, radius) {
                assert_ne!(i, j);
                assert!(Flock::brute_force_neighbors(j, &positions, radius).contains(&i));
            }
        }
    }

    #[test]
    fn test_neighbor_radius_inclusive() {
        let positions = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.5, 0.0)];
        assert_eq!(Flock::brute_force_neighbors(0, &positions, 2.0), vec![1]);
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let params = FlockParams { agent_count: 150, seed: 21, ..FlockParams::default() };
        let mut flock = Flock::new(params.clone()).unwrap();
        for _ in 0..5 {
            flock.tick(0.1);
        }

        let positions: Vec<Vec3> = flock.agents().iter().map(|a| a.position).collect();
        let radius = params.neighbor_radius();
        let mut grid = Flock::grid_for(&params);
        grid.rebuild(&positions);
        for i in 0..positions.len() {
            assert_eq!(
                Flock::grid_neighbors(&grid, i, &positions, radius),
                Flock::brute_force_neighbors(i, &positions, radius)
            );
        }
    }

    #[test]
    fn test_grid_and_brute_force_runs_agree() {
        let with_grid = FlockParams { agent_count: 30, seed: 5, ..FlockParams::default() };
        let without = FlockParams { use_spatial_grid: false, ..with_grid.clone() };
        let mut a = Flock::new(with_grid).unwrap();
        let mut b = Flock::new(without).unwrap();
        for _ in 0..50 {
            a.tick(0.05);
            b.tick(0.05);
        }
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn test_single_agent_wanders_only() {
        let params = FlockParams { agent_count: 1, seed: 9, ..FlockParams::default() };
        let mut flock = Flock::new(params.clone()).unwrap();

        // A second flock with only wander enabled draws the same stream
        let mut wander_only = Flock::new(params.wander_only()).unwrap();
        for _ in 0..30 {
            assert!(flock.neighbors(0).is_empty());
            flock.tick(0.1);
            wander_only.tick(0.1);
            assert_eq!(flock.agents()[0], wander_only.agents()[0]);
        }
        assert_invariants(&flock);
    }

    #[test]
    fn test_single_agent_without_wander_keeps_velocity() {
        let params = FlockParams {
            agent_count: 1,
            world_box_size: 1000.0,
            wander_enabled: false,
            ..FlockParams::default()
        };
        let mut flock = Flock::new(params).unwrap();
        let before = flock.agents()[0].velocity;
        flock.tick(0.1);
        assert!((flock.agents()[0].velocity - before).length() < 1e-5);
    }

    #[test]
    fn test_scatter() {
        let mut flock = Flock::new(FlockParams { agent_count: 25, show_trails: true, ..FlockParams::default() }).unwrap();
        for _ in 0..5 {
            flock.tick(0.1);
        }
        let before: Vec<Vec3> = flock.agents().iter().map(|a| a.position).collect();
        assert!(flock.agents().iter().all(|a| a.trail.len() == 5));

        flock.scatter();

        let after: Vec<Vec3> = flock.agents().iter().map(|a| a.position).collect();
        assert_ne!(before, after);
        for agent in flock.agents() {
            assert!(agent.position.length() <= 10.0 + EPS);
            assert!((agent.speed() - 5.0).abs() < EPS);
            assert!(agent.trail.is_empty());
        }
        assert_invariants(&flock);
    }

    #[test]
    fn test_resize() {
        let mut flock = Flock::new(FlockParams { agent_count: 10, show_trails: true, ..FlockParams::default() }).unwrap();
        flock.tick(0.1);
        let kept: Vec<Agent> = flock.agents()[..4].to_vec();

        flock.resize(4);
        assert_eq!(flock.agents(), kept.as_slice());
        assert_eq!(flock.params().agent_count, 4);

        flock.resize(12);
        assert_eq!(flock.len(), 12);
        assert!(flock.agents()[4..].iter().all(|a| a.trail.is_empty()));
        assert_invariants(&flock);
    }

    #[test]
    fn test_trails_capped() {
        let mut flock = Flock::new(FlockParams {
            agent_count: 3,
            show_trails: true,
            max_trail_length: 4,
            ..FlockParams::default()
        })
        .unwrap();
        for _ in 0..10 {
            flock.tick(0.05);
        }
        for agent in flock.agents() {
            assert_eq!(agent.trail.len(), 4);
            assert_eq!(agent.trail.back(), Some(&agent.position));
        }
    }

    #[test]
    fn test_set_params() {
        let mut flock = Flock::new(FlockParams::default()).unwrap();
        let bad = FlockParams { min_velocity: 10.0, ..FlockParams::default() };
        assert!(flock.set_params(bad).is_err());
        assert_eq!(flock.len(), 20);

        flock.set_params(FlockParams { agent_count: 7, ..FlockParams::default() }).unwrap();
        assert_eq!(flock.len(), 7);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = FlockParams { min_velocity: 6.0, max_velocity: 2.0, ..FlockParams::default() };
        assert!(matches!(Flock::new(params), Err(ConfigError::VelocityRange { .. })));
    }

    #[test]
    fn test_deterministic() {
        let params = FlockParams { seed: 77, ..FlockParams::default() };
        let mut a = Flock::new(params.clone()).unwrap();
        let mut b = Flock::new(params).unwrap();
        for _ in 0..20 {
            a.tick(0.05);
            b.tick(0.05);
        }
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn test_emit() {
        let mut flock = Flock::new(FlockParams { agent_count: 5, ..FlockParams::default() }).unwrap();
        flock.tick(0.1);
        let mut collector = MeshCollector::new();
        flock.emit(&mut collector);
        assert_eq!(collector.submissions, 5);
        assert_eq!(collector.mesh.vertex_count(), 5 * 18);
    }
}
