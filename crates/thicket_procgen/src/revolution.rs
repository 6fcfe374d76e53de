use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use thicket_core::error::{ensure_finite, ensure_segments};
use thicket_core::math::bezier_point;
use thicket_core::{ConfigError, Mesh};

/// Revolve a cubic Bezier profile (in the XY plane) around +Y.
///
/// Produces a `(segments + 1)^2` vertex grid: row `i` samples the profile at
/// `t = i / segments`, column `j` rotates it by `j / segments` of a turn.
/// The seam column is duplicated so uvs stay continuous.
pub fn bezier_revolution(control_points: &[Vec3; 4], segments: u32) -> Result<Mesh, ConfigError> {
    ensure_segments("revolution", segments, 3)?;
    for p in control_points {
        ensure_finite("revolution control point", p.x + p.y + p.z)?;
    }

    let stride = segments + 1;
    let mut vertices = Vec::with_capacity((stride * stride) as usize);
    let mut uvs = Vec::with_capacity(vertices.capacity());

    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let profile = bezier_point(t, control_points);
        for j in 0..=segments {
            let u = j as f32 / segments as f32;
            vertices.push(Quat::from_rotation_y(u * TAU) * profile);
            uvs.push(Vec2::new(u, t));
        }
    }

    let mut triangles = Vec::with_capacity((segments * segments * 2) as usize);
    for i in 0..segments {
        for j in 0..segments {
            let a = i * stride + j;
            let b = (i + 1) * stride + j;
            let c = i * stride + j + 1;
            let d = (i + 1) * stride + j + 1;
            triangles.push([a, b, c]);
            triangles.push([b, d, c]);
        }
    }

    Ok(Mesh::new(vertices, triangles).with_uvs(uvs))
}

/// Close a revolution surface from [`bezier_revolution`] with a disk facing -Y.
///
/// The disk fans the end ring with the larger radius; the other end is usually
/// a pole. Ring vertices are duplicated so the rim keeps a hard edge.
pub fn add_bottom_cap(mesh: &mut Mesh, segments: u32) -> Result<(), ConfigError> {
    ensure_segments("revolution cap", segments, 3)?;
    let stride = segments as usize + 1;
    if mesh.vertices.len() < stride * stride {
        return Err(ConfigError::InvalidCount {
            what: "revolution vertices",
            min: stride * stride,
            got: mesh.vertices.len(),
        });
    }

    let radius_of = |row: usize| {
        let v = mesh.vertices[row * stride];
        Vec2::new(v.x, v.z).length()
    };
    let (row, ring_radius) = if radius_of(segments as usize) >= radius_of(0) {
        (segments as usize, radius_of(segments as usize))
    } else {
        (0, radius_of(0))
    };

    let ring: Vec<Vec3> = mesh.vertices[row * stride..(row + 1) * stride].to_vec();
    let center = Vec3::new(0.0, ring[0].y, 0.0);
    let start = mesh.vertices.len() as u32;

    mesh.vertices.extend_from_slice(&ring);
    let center_index = mesh.vertices.len() as u32;
    mesh.vertices.push(center);

    if let Some(uvs) = mesh.uvs.as_mut() {
        let scale = 0.5 / ring_radius.max(f32::EPSILON);
        uvs.extend(ring.iter().map(|p| Vec2::new(p.x, p.z) * scale + Vec2::splat(0.5)));
        uvs.push(Vec2::splat(0.5));
    }

    for j in 0..segments {
        mesh.triangles.push([center_index, start + j + 1, start + j]);
    }

    mesh.recalculate_normals();
    Ok(())
}
