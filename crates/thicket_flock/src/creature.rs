use glam::Vec3;
use thicket_core::Mesh;

pub const CREATURE_COLOR: [f32; 3] = [0.6, 0.4, 0.2];

/// Vertices moved down by the flap offset
const LOWERED: [usize; 6] = [4, 5, 9, 11, 14, 17];
/// Vertices moved up by the flap offset
const RAISED: [usize; 3] = [6, 7, 15];

/// Small winged dart, nose at +Z. Faces do not share vertices so each
/// wing can be deformed on its own.
pub fn creature_mesh() -> Mesh {
    let vertices = vec![
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(-0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.0, -1.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.2, -0.5),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.5, 0.2, -0.5),
        Vec3::new(0.0, 0.2, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.2, 0.0),
        Vec3::new(-0.5, 0.2, -0.5),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(-0.5, 0.2, -0.5),
        Vec3::new(-0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.2, -0.5),
        Vec3::new(-0.5, 0.2, -0.5),
        Vec3::new(0.0, 0.2, 0.0),
    ];
    let triangles = vec![
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [9, 10, 11],
        [12, 13, 14],
        [13, 12, 14],
        [15, 16, 17],
        [16, 15, 17],
    ];
    Mesh::new(vertices, triangles)
}

/// Sinusoidal wing beat applied to [`creature_mesh`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingFlap {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for WingFlap {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            amplitude: 0.2,
        }
    }
}

impl WingFlap {
    pub fn offset(&self, time: f32) -> f32 {
        (time * self.frequency).sin() * self.amplitude
    }

    /// Copy of `base` with the wings posed for `time` seconds
    pub fn pose(&self, base: &Mesh, time: f32) -> Mesh {
        let offset = self.offset(time);
        let mut mesh = base.clone();
        for &i in &LOWERED {
            if let Some(v) = mesh.vertices.get_mut(i) {
                v.y -= offset;
            }
        }
        for &i in &RAISED {
            if let Some(v) = mesh.vertices.get_mut(i) {
                v.y += offset;
            }
        }
        mesh.recalculate_normals();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_mesh() {
        let mesh = creature_mesh();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(mesh.indices_valid());
        assert_eq!(mesh.bounds().max.z, 1.0);
    }

    #[test]
    fn test_flap_moves_wings_only() {
        let base = creature_mesh();
        let flap = WingFlap::default();
        let time = std::f32::consts::FRAC_PI_4;
        let offset = flap.offset(time);
        assert!((offset - 0.2).abs() < 1e-6);

        let posed = flap.pose(&base, time);
        for (i, (a, b)) in base.vertices.iter().zip(&posed.vertices).enumerate() {
            let expected = if LOWERED.contains(&i) {
                -offset
            } else if RAISED.contains(&i) {
                offset
            } else {
                0.0
            };
            assert!((b.y - a.y - expected).abs() < 1e-6, "vertex {i}");
            assert_eq!((a.x, a.z), (b.x, b.z));
        }
    }

    #[test]
    fn test_rest_pose() {
        let base = creature_mesh();
        assert_eq!(WingFlap::default().pose(&base, 0.0).vertices, base.vertices);
    }
}
