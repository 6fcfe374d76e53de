use std::collections::VecDeque;

use glam::{Quat, Vec3};

/// One flocking creature
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub trail: VecDeque<Vec3>,
}

impl Agent {
    pub fn new(position: Vec3, velocity: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            velocity,
            rotation,
            trail: VecDeque::new(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Direction the creature's nose points at
    pub fn heading(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Append a trail sample, dropping the oldest beyond `max_len`
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_back(self.position);
        while self.trail.len() > max_len {
            self.trail.pop_front();
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_is_bounded() {
        let mut agent = Agent::new(Vec3::ZERO, Vec3::X, Quat::IDENTITY);
        for i in 0..5 {
            agent.position = Vec3::splat(i as f32);
            agent.record_trail(3);
        }
        assert_eq!(agent.trail.len(), 3);
        assert_eq!(agent.trail.front(), Some(&Vec3::splat(2.0)));
        assert_eq!(agent.trail.back(), Some(&Vec3::splat(4.0)));

        agent.clear_trail();
        assert!(agent.trail.is_empty());
    }

    #[test]
    fn test_heading() {
        let agent = Agent::new(Vec3::ZERO, Vec3::X, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((agent.heading() - Vec3::X).length() < 1e-5);
        assert_eq!(agent.speed(), 1.0);
    }
}
