use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};
use thicket_core::error::{ensure_non_negative, ensure_positive, ensure_segments};
use thicket_core::{ConfigError, Mesh};

/// Unit ring offsets `(cos θ, 0, sin θ)` for `count` evenly spaced angles
pub(crate) fn ring_directions(count: u32) -> impl Iterator<Item = Vec3> {
    (0..count).map(move |i| {
        let angle = i as f32 / count as f32 * TAU;
        Vec3::new(angle.cos(), 0.0, angle.sin())
    })
}

/// Stitch a stack of rings into a closed tube.
///
/// Every ring has the same vertex count, ordered by increasing angle around
/// the tube axis (the `(cos θ, 0, sin θ)` direction at the base). Rings are
/// joined bottom to top and each end gets a fan cap around its centre vertex.
pub(crate) fn closed_tube(rings: &[Vec<Vec3>], bottom_center: Vec3, top_center: Vec3) -> Mesh {
    let ring_count = rings.len();
    let n = rings.first().map_or(0, |r| r.len()) as u32;

    let mut vertices = Vec::with_capacity(ring_count * n as usize + 2);
    let mut uvs = Vec::with_capacity(vertices.capacity());
    for (k, ring) in rings.iter().enumerate() {
        let v = k as f32 / (ring_count.max(2) - 1) as f32;
        for (i, p) in ring.iter().enumerate() {
            vertices.push(*p);
            uvs.push(Vec2::new(i as f32 / n as f32, v));
        }
    }
    let bottom = vertices.len() as u32;
    vertices.push(bottom_center);
    uvs.push(Vec2::new(0.5, 0.0));
    let top = vertices.len() as u32;
    vertices.push(top_center);
    uvs.push(Vec2::new(0.5, 1.0));

    let mut triangles = Vec::with_capacity(2 * n as usize * ring_count);

    // Side quads
    for k in 0..ring_count.saturating_sub(1) as u32 {
        let lower = k * n;
        let upper = (k + 1) * n;
        for i in 0..n {
            let j = (i + 1) % n;
            triangles.push([lower + i, upper + i, lower + j]);
            triangles.push([lower + j, upper + i, upper + j]);
        }
    }

    // Caps
    let last = (ring_count as u32 - 1) * n;
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push([bottom, i, j]);
        triangles.push([top, last + j, last + i]);
    }

    Mesh::new(vertices, triangles).with_uvs(uvs)
}

/// Closed frustum standing on y = 0.
///
/// `segments` side vertices per ring at y = 0 (`base_radius`) and
/// y = `height` (`top_radius`), plus one centre vertex per cap.
pub fn frustum(base_radius: f32, top_radius: f32, height: f32, segments: u32) -> Result<Mesh, ConfigError> {
    ensure_segments("frustum", segments, 3)?;
    ensure_non_negative("frustum base radius", base_radius)?;
    ensure_non_negative("frustum top radius", top_radius)?;
    ensure_positive("frustum height", height)?;

    let base: Vec<Vec3> = ring_directions(segments).map(|d| d * base_radius).collect();
    let top: Vec<Vec3> = ring_directions(segments)
        .map(|d| d * top_radius + Vec3::Y * height)
        .collect();

    Ok(closed_tube(&[base, top], Vec3::ZERO, Vec3::Y * height))
}

pub fn cylinder(radius: f32, height: f32, segments: u32) -> Result<Mesh, ConfigError> {
    frustum(radius, radius, height, segments)
}

/// Trunk with ridged bark: `2 * segments` ring vertices alternating between
/// `radius + bark_depth` and `radius`.
pub fn bark_trunk(radius: f32, height: f32, segments: u32, bark_depth: f32) -> Result<Mesh, ConfigError> {
    ensure_segments("bark trunk", segments, 2)?;
    ensure_positive("bark trunk radius", radius)?;
    ensure_positive("bark trunk height", height)?;
    ensure_non_negative("bark depth", bark_depth)?;

    let bark_segments = segments * 2;
    let ring: Vec<Vec3> = ring_directions(bark_segments)
        .enumerate()
        .map(|(i, d)| {
            let offset = if i % 2 == 0 { bark_depth } else { 0.0 };
            d * (radius + offset)
        })
        .collect();
    let top: Vec<Vec3> = ring.iter().map(|p| *p + Vec3::Y * height).collect();

    Ok(closed_tube(&[ring, top], Vec3::ZERO, Vec3::Y * height))
}

/// Cone with its base disk on y = 0 and apex at y = `height`
pub fn cone(radius: f32, height: f32, segments: u32) -> Result<Mesh, ConfigError> {
    ensure_segments("cone", segments, 3)?;
    ensure_positive("cone radius", radius)?;
    ensure_positive("cone height", height)?;

    let mut vertices: Vec<Vec3> = ring_directions(segments).map(|d| d * radius).collect();
    let base = vertices.len() as u32;
    vertices.push(Vec3::ZERO);
    let apex = vertices.len() as u32;
    vertices.push(Vec3::Y * height);

    let mut triangles = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        let j = (i + 1) % segments;
        triangles.push([i, apex, j]);
        triangles.push([base, i, j]);
    }

    Ok(Mesh::new(vertices, triangles))
}

/// Upper half of a UV sphere, open at the equator
pub fn hemisphere(radius: f32, segments: u32, rings: u32) -> Result<Mesh, ConfigError> {
    ensure_segments("hemisphere", segments, 3)?;
    ensure_segments("hemisphere rings", rings, 1)?;
    ensure_positive("hemisphere radius", radius)?;

    let stride = segments + 1;
    let mut vertices = Vec::with_capacity((stride * (rings + 1)) as usize);
    let mut uvs = Vec::with_capacity(vertices.capacity());

    for i in 0..=rings {
        let v = i as f32 / rings as f32;
        let phi = v * FRAC_PI_2;
        for j in 0..=segments {
            let u = j as f32 / segments as f32;
            let theta = u * TAU;
            vertices.push(Vec3::new(
                radius * theta.cos() * phi.sin(),
                radius * phi.cos(),
                radius * theta.sin() * phi.sin(),
            ));
            uvs.push(Vec2::new(u, v));
        }
    }

    let mut triangles = Vec::with_capacity((segments * rings * 2) as usize);
    for i in 0..rings {
        for j in 0..segments {
            let a = i * stride + j;
            let b = (i + 1) * stride + j;
            let c = (i + 1) * stride + j + 1;
            let d = i * stride + j + 1;
            triangles.push([a, d, b]);
            triangles.push([b, d, c]);
        }
    }

    Ok(Mesh::new(vertices, triangles).with_uvs(uvs))
}

/// Flat ring in the XZ plane facing +Y, between `radius` and `radius + thickness`
pub fn annulus(radius: f32, thickness: f32, segments: u32) -> Result<Mesh, ConfigError> {
    ensure_segments("annulus", segments, 3)?;
    ensure_non_negative("annulus radius", radius)?;
    ensure_positive("annulus thickness", thickness)?;

    let mut vertices = Vec::with_capacity(segments as usize * 2);
    let mut uvs = Vec::with_capacity(segments as usize * 2);
    for (i, d) in ring_directions(segments).enumerate() {
        let u = i as f32 / segments as f32;
        vertices.push(d * radius);
        vertices.push(d * (radius + thickness));
        uvs.push(Vec2::new(u, 0.0));
        uvs.push(Vec2::new(u, 1.0));
    }

    let mut triangles = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        let next = (i + 1) % segments;
        push_flat_quad(&mut triangles, [i * 2, i * 2 + 1, next * 2 + 1, next * 2]);
    }

    Ok(Mesh::new(vertices, triangles).with_uvs(uvs))
}

/// Upright quad in the XY plane facing +Z, centred on the origin
pub fn quad(width: f32, height: f32) -> Result<Mesh, ConfigError> {
    ensure_positive("quad width", width)?;
    ensure_positive("quad height", height)?;

    let (hw, hh) = (width * 0.5, height * 0.5);
    let vertices = vec![
        Vec3::new(-hw, -hh, 0.0),
        Vec3::new(hw, -hh, 0.0),
        Vec3::new(hw, hh, 0.0),
        Vec3::new(-hw, hh, 0.0),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    Ok(Mesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]]).with_uvs(uvs))
}

/// Icosahedron of the given radius, subdivided `subdivisions` times
pub fn icosphere(radius: f32, subdivisions: u32) -> Result<Mesh, ConfigError> {
    ensure_positive("icosphere radius", radius)?;

    let (mut vertices, mut triangles) = base_icosahedron();
    for _ in 0..subdivisions {
        subdivide(&mut vertices, &mut triangles);
    }
    for v in &mut vertices {
        *v *= radius;
    }

    Ok(Mesh::new(vertices, triangles))
}

/// Two up-facing triangles for a quad whose corners `[a, b, c, d]` run
/// counter-clockwise when the XZ plane is drawn with +X right and +Z up.
pub(crate) fn push_flat_quad(triangles: &mut Vec<[u32; 3]>, [a, b, c, d]: [u32; 4]) {
    triangles.push([a, c, b]);
    triangles.push([a, d, c]);
}

fn base_icosahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    // Golden ratio
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let vertices = vec![
        Vec3::new(-1.0, t, 0.0).normalize(),
        Vec3::new(1.0, t, 0.0).normalize(),
        Vec3::new(-1.0, -t, 0.0).normalize(),
        Vec3::new(1.0, -t, 0.0).normalize(),
        Vec3::new(0.0, -1.0, t).normalize(),
        Vec3::new(0.0, 1.0, t).normalize(),
        Vec3::new(0.0, -1.0, -t).normalize(),
        Vec3::new(0.0, 1.0, -t).normalize(),
        Vec3::new(t, 0.0, -1.0).normalize(),
        Vec3::new(t, 0.0, 1.0).normalize(),
        Vec3::new(-t, 0.0, -1.0).normalize(),
        Vec3::new(-t, 0.0, 1.0).normalize(),
    ];

    let triangles = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    (vertices, triangles)
}

fn subdivide(vertices: &mut Vec<Vec3>, triangles: &mut Vec<[u32; 3]>) {
    let mut midpoints = HashMap::new();
    let mut next = Vec::with_capacity(triangles.len() * 4);

    for &[i0, i1, i2] in triangles.iter() {
        let a = midpoint(i0, i1, vertices, &mut midpoints);
        let b = midpoint(i1, i2, vertices, &mut midpoints);
        let c = midpoint(i2, i0, vertices, &mut midpoints);

        next.push([i0, a, c]);
        next.push([i1, b, a]);
        next.push([i2, c, b]);
        next.push([a, b, c]);
    }

    *triangles = next;
}

fn midpoint(p1: u32, p2: u32, vertices: &mut Vec<Vec3>, midpoints: &mut HashMap<(u32, u32), u32>) -> u32 {
    let key = if p1 < p2 { (p1, p2) } else { (p2, p1) };
    if let Some(&index) = midpoints.get(&key) {
        return index;
    }

    let middle = (vertices[p1 as usize] + vertices[p2 as usize]).normalize();
    let index = vertices.len() as u32;
    vertices.push(middle);
    midpoints.insert(key, index);
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face normal points away from the given axis point at its height
    fn assert_outward(mesh: &Mesh, center_of: impl Fn(Vec3) -> Vec3) {
        for (i, tri) in mesh.triangles.iter().enumerate() {
            let n = mesh.face_normal(i);
            if n.length_squared() < 1e-12 {
                continue;
            }
            let centroid = tri.iter().map(|&v| mesh.vertices[v as usize]).sum::<Vec3>() / 3.0;
            assert!(
                n.dot(centroid - center_of(centroid)) > 0.0,
                "triangle {i} faces inward"
            );
        }
    }

    #[test]
    fn test_cylinder_properties() {
        let (r, h, n) = (0.75, 2.0, 12);
        let mesh = cylinder(r, h, n).unwrap();

        assert_eq!(mesh.vertex_count(), (n * 2 + 2) as usize);
        assert_eq!(mesh.triangle_count(), (n * 4) as usize);
        assert!(mesh.indices_valid());
        assert_eq!(mesh.open_edge_count(), 0);

        for v in mesh.vertices.iter().take(n as usize) {
            assert!(v.y.abs() < 1e-6);
            assert!((Vec2::new(v.x, v.z).length() - r).abs() < 1e-5);
        }
        assert_outward(&mesh, |_| Vec3::new(0.0, h * 0.5, 0.0));
    }

    #[test]
    fn test_cylinder_closed_for_small_counts() {
        for n in 3..8 {
            assert_eq!(cylinder(1.0, 1.0, n).unwrap().open_edge_count(), 0);
        }
    }

    #[test]
    fn test_frustum_radii() {
        let mesh = frustum(1.0, 0.25, 3.0, 8).unwrap();
        for v in &mesh.vertices[8..16] {
            assert!((v.y - 3.0).abs() < 1e-6);
            assert!((Vec2::new(v.x, v.z).length() - 0.25).abs() < 1e-5);
        }
        assert_eq!(mesh.open_edge_count(), 0);
    }

    #[test]
    fn test_invalid_segments() {
        assert!(matches!(
            cylinder(1.0, 1.0, 2),
            Err(ConfigError::InvalidSegments { got: 2, .. })
        ));
        assert!(frustum(1.0, 1.0, 0.0, 8).is_err());
        assert!(frustum(-1.0, 1.0, 1.0, 8).is_err());
    }

    #[test]
    fn test_bark_trunk() {
        let mesh = bark_trunk(0.5, 6.0, 16, 0.1).unwrap();
        assert_eq!(mesh.vertex_count(), 32 * 2 + 2);
        assert_eq!(mesh.open_edge_count(), 0);
        let bounds = mesh.bounds();
        assert!((bounds.size().y - 6.0).abs() < 1e-5);
        assert!((bounds.extents().x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_cone_closed() {
        let mesh = cone(0.1, 1.0, 8).unwrap();
        assert_eq!(mesh.open_edge_count(), 0);
        assert_outward(&mesh, |_| Vec3::new(0.0, 0.25, 0.0));
    }

    #[test]
    fn test_hemisphere_outward() {
        let mesh = hemisphere(0.8, 16, 8).unwrap();
        assert_eq!(mesh.vertex_count(), 17 * 9);
        assert!(mesh.vertices.iter().all(|v| v.y >= -1e-6));
        assert_outward(&mesh, |_| Vec3::ZERO);
    }

    #[test]
    fn test_annulus_faces_up() {
        let mesh = annulus(2.0, 0.1, 32).unwrap();
        for i in 0..mesh.triangle_count() {
            assert!(mesh.face_normal(i).y > 0.0);
        }
    }

    #[test]
    fn test_icosphere() {
        let mesh = icosphere(0.1, 1).unwrap();
        assert_eq!(mesh.triangle_count(), 80);
        assert_eq!(mesh.vertex_count(), 42);
        assert_eq!(mesh.open_edge_count(), 0);
        assert!(mesh.vertices.iter().all(|v| (v.length() - 0.1).abs() < 1e-5));
        assert_outward(&mesh, |_| Vec3::ZERO);
    }

    #[test]
    fn test_quad_faces_forward() {
        let mesh = quad(2.0, 1.0).unwrap();
        assert!(mesh.face_normal(0).z > 0.0);
        assert!(mesh.face_normal(1).z > 0.0);
    }
}
