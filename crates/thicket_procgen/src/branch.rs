use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use thicket_core::error::{ensure_finite, ensure_positive, ensure_segments};
use thicket_core::{ConfigError, Mesh};

use crate::primitives::{closed_tube, ring_directions};

/// Dimensions of one curved branch segment.
///
/// The centreline starts at the origin heading +Y and bends toward +X along a
/// circular arc of total angle `bend`. A `bend` of zero gives a straight
/// tapered tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchShape {
    pub base_radius: f32,
    pub top_radius: f32,
    pub length: f32,
    pub bend: f32,
    pub segments: u32,
    pub curve_steps: u32,
}

impl BranchShape {
    pub const BASE_RADIUS_FACTOR: f32 = 0.6;
    pub const TOP_RADIUS_FACTOR: f32 = 0.4;
    pub const BASE_LENGTH: f32 = 3.0;
    pub const LENGTH_FALLOFF: f32 = 0.7;
    pub const DEFAULT_SEGMENTS: u32 = 16;
    pub const DEFAULT_CURVE_STEPS: u32 = 3;
    /// Quarter turn: the tip ends up heading along +X
    pub const DEFAULT_BEND: f32 = FRAC_PI_2;

    /// Branch dimensions for a recursion depth, sized from the parent's radius
    pub fn for_order(order: u32, parent_radius: f32) -> Self {
        let base_radius = parent_radius * Self::BASE_RADIUS_FACTOR;
        Self {
            base_radius,
            top_radius: base_radius * Self::TOP_RADIUS_FACTOR,
            length: Self::BASE_LENGTH * Self::LENGTH_FALLOFF.powi(order as i32),
            bend: Self::DEFAULT_BEND,
            segments: Self::DEFAULT_SEGMENTS,
            curve_steps: Self::DEFAULT_CURVE_STEPS,
        }
    }

    pub fn with_bend(mut self, bend: f32) -> Self {
        self.bend = bend;
        self
    }

    pub fn with_resolution(mut self, segments: u32, curve_steps: u32) -> Self {
        self.segments = segments;
        self.curve_steps = curve_steps;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_segments("branch", self.segments, 3)?;
        ensure_segments("branch curve steps", self.curve_steps, 1)?;
        ensure_positive("branch base radius", self.base_radius)?;
        ensure_positive("branch top radius", self.top_radius)?;
        ensure_positive("branch length", self.length)?;
        ensure_finite("branch bend", self.bend)
    }

    /// Point on the centreline and its local frame `(normal, binormal)`
    /// at arc fraction `t` in `[0, 1]`
    pub fn frame_at(&self, t: f32) -> (Vec3, Vec3, Vec3) {
        if self.bend.abs() < 1e-6 {
            return (Vec3::Y * self.length * t, Vec3::X, Vec3::Z);
        }
        let radius = self.length / self.bend;
        let angle = self.bend * t;
        let (sin, cos) = angle.sin_cos();
        let point = Vec3::new(radius * (1.0 - cos), radius * sin, 0.0);
        (point, Vec3::new(cos, -sin, 0.0), Vec3::Z)
    }

    /// Centreline end point
    pub fn tip(&self) -> Vec3 {
        self.frame_at(1.0).0
    }

    pub fn build(&self) -> Result<Mesh, ConfigError> {
        self.validate()?;

        let steps = self.curve_steps;
        let directions: Vec<Vec3> = ring_directions(self.segments).collect();
        let rings: Vec<Vec<Vec3>> = (0..=steps)
            .map(|step| {
                let t = step as f32 / steps as f32;
                let (center, normal, binormal) = self.frame_at(t);
                let r = self.base_radius + (self.top_radius - self.base_radius) * t;
                directions
                    .iter()
                    .map(|d| center + (normal * d.x + binormal * d.z) * r)
                    .collect()
            })
            .collect();

        Ok(closed_tube(&rings, Vec3::ZERO, self.tip()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_constants() {
        let shape = BranchShape::for_order(2, 0.5);
        assert!((shape.base_radius - 0.3).abs() < 1e-6);
        assert!((shape.top_radius - 0.12).abs() < 1e-6);
        assert!((shape.length - 3.0 * 0.49).abs() < 1e-5);
    }

    #[test]
    fn test_branch_closed_and_sized() {
        let shape = BranchShape::for_order(1, 0.5);
        let mesh = shape.build().unwrap();

        let n = shape.segments as usize;
        assert_eq!(mesh.vertex_count(), n * (shape.curve_steps as usize + 1) + 2);
        assert_eq!(mesh.open_edge_count(), 0);
        assert!(mesh.indices_valid());

        // Base ring sits on y = 0 at the base radius
        for v in &mesh.vertices[..n] {
            assert!(v.y.abs() < 1e-5);
            assert!((v.length() - shape.base_radius).abs() < 1e-5);
        }
    }

    #[test]
    fn test_branch_normals_point_away_from_centreline() {
        let shape = BranchShape::for_order(0, 1.0);
        let mesh = shape.build().unwrap();
        let n = shape.segments as usize;

        // Side triangles come first in closed_tube order
        let side = n * 2 * shape.curve_steps as usize;
        for i in 0..side {
            let tri = mesh.triangles[i];
            let ring = tri[0] as usize / n;
            let t = ring.min(shape.curve_steps as usize) as f32 / shape.curve_steps as f32;
            let (center, _, _) = shape.frame_at(t);
            let p = mesh.vertices[tri[0] as usize];
            assert!(mesh.face_normal(i).dot(p - center) > 0.0, "side triangle {i} faces inward");
        }
    }

    #[test]
    fn test_default_bend_is_quarter_turn() {
        let shape = BranchShape::for_order(0, 1.0);
        let radius = shape.length / FRAC_PI_2;
        let tip = shape.tip();
        assert!((tip.x - radius).abs() < 1e-4);
        assert!((tip.y - radius).abs() < 1e-4);

        // Tip ring lies in a vertical plane: its frame normal points down
        let (_, normal, _) = shape.frame_at(1.0);
        assert!((normal - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_arc_length() {
        let shape = BranchShape::for_order(0, 1.0).with_bend(std::f32::consts::FRAC_PI_4);
        let radius = shape.length / shape.bend;
        let tip = shape.tip();
        let (sin, cos) = shape.bend.sin_cos();
        assert!((tip.x - radius * (1.0 - cos)).abs() < 1e-4);
        assert!((tip.y - radius * sin).abs() < 1e-4);
    }

    #[test]
    fn test_straight_branch() {
        let shape = BranchShape::for_order(0, 1.0).with_bend(0.0);
        assert_eq!(shape.tip(), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(shape.build().unwrap().open_edge_count(), 0);
    }

    #[test]
    fn test_rejects_bad_resolution() {
        let shape = BranchShape::for_order(0, 1.0).with_resolution(2, 3);
        assert!(shape.build().is_err());
        let shape = BranchShape::for_order(0, 1.0).with_resolution(8, 0);
        assert!(shape.build().is_err());
        assert!(BranchShape::for_order(0, 0.0).build().is_err());
    }
}
