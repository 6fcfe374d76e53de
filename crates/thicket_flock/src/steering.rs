//! Steering rules.
//!
//! Each rule reads the tick-start snapshot only and returns a direction; the
//! caller scales it by the rule's strength and adds it to the velocity.

use glam::Vec3;
use thicket_core::GenRng;

/// Unit vector toward the neighbours' centroid
pub fn cohesion(position: Vec3, neighbors: &[usize], positions: &[Vec3]) -> Vec3 {
    if neighbors.is_empty() {
        return Vec3::ZERO;
    }
    let center = neighbors.iter().map(|&j| positions[j]).sum::<Vec3>() / neighbors.len() as f32;
    (center - position).normalize_or_zero()
}

/// Unit vector along the neighbours' mean velocity
pub fn alignment(neighbors: &[usize], velocities: &[Vec3]) -> Vec3 {
    if neighbors.is_empty() {
        return Vec3::ZERO;
    }
    let mean = neighbors.iter().map(|&j| velocities[j]).sum::<Vec3>() / neighbors.len() as f32;
    mean.normalize_or_zero()
}

/// `Σ (A - B) / d²` before normalization. Coincident neighbours add nothing.
pub fn separation_sum(position: Vec3, neighbors: &[usize], positions: &[Vec3]) -> Vec3 {
    neighbors
        .iter()
        .map(|&j| position - positions[j])
        .filter(|offset| offset.length_squared() > 0.0)
        .map(|offset| offset / offset.length_squared())
        .sum()
}

pub fn separation(position: Vec3, neighbors: &[usize], positions: &[Vec3]) -> Vec3 {
    separation_sum(position, neighbors, positions).normalize_or_zero()
}

/// Fresh random vector inside the unit ball
pub fn wander(rng: &mut GenRng) -> Vec3 {
    rng.inside_unit_sphere()
}

/// Clamp `velocity` into `[min, max]` keeping its direction. A zero
/// velocity takes `fallback` (then +Z) as its direction.
pub fn clamp_speed(velocity: Vec3, min: f32, max: f32, fallback: Vec3) -> Vec3 {
    let direction = velocity
        .try_normalize()
        .or_else(|| fallback.try_normalize())
        .unwrap_or(Vec3::Z);
    let speed = velocity.length().min(max).max(min);
    direction * speed
}
