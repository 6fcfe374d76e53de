use glam::Vec3;

/// Spheres claimed by already accepted pieces of a structure.
///
/// Points are in the structure's own space (plant space for branches, grid
/// space for buildings).
#[derive(Debug, Clone, Default)]
pub struct PlacementRegistry {
    spheres: Vec<(Vec3, f32)>,
}

impl PlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `point` lies closer than `epsilon` to any claimed point
    pub fn collides(&self, point: Vec3, epsilon: f32) -> bool {
        self.spheres
            .iter()
            .any(|(claimed, _)| claimed.distance_squared(point) < epsilon * epsilon)
    }

    /// True when the sphere overlaps any claimed sphere
    pub fn overlaps(&self, point: Vec3, radius: f32) -> bool {
        self.spheres.iter().any(|(claimed, claimed_radius)| {
            let reach = radius + claimed_radius;
            claimed.distance_squared(point) < reach * reach
        })
    }

    pub fn register(&mut self, point: Vec3, radius: f32) {
        self.spheres.push((point, radius));
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_collision() {
        let mut registry = PlacementRegistry::new();
        assert!(!registry.collides(Vec3::ZERO, 1.0));

        registry.register(Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert!(registry.collides(Vec3::new(1.2, 0.0, 0.0), 0.3));
        assert!(!registry.collides(Vec3::new(1.5, 0.0, 0.0), 0.3));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sphere_overlap() {
        let mut registry = PlacementRegistry::new();
        registry.register(Vec3::ZERO, 2.0);
        assert!(registry.overlaps(Vec3::new(3.0, 0.0, 0.0), 1.5));
        assert!(!registry.overlaps(Vec3::new(4.0, 0.0, 0.0), 1.5));

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.overlaps(Vec3::ZERO, 10.0));
    }
}
