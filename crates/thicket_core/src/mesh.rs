use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec2, Vec3};

/// Interleaved vertex ready for upload by a render adapter
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Axis-aligned bounds of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn extents(&self) -> Vec3 {
        self.size() * 0.5
    }
}

/// Indexed triangle mesh.
///
/// Every triangle `[a, b, c]` is wound so that `(b - a) x (c - a)` points out
/// of the surface; normals are recomputed from that winding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub uvs: Option<Vec<Vec2>>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let mut mesh = Self {
            vertices,
            triangles,
            uvs: None,
            normals: Vec::new(),
        };
        mesh.recalculate_normals();
        mesh
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        debug_assert_eq!(uvs.len(), self.vertices.len());
        self.uvs = Some(uvs);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Smooth normals: area-weighted face normals accumulated per vertex
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in &self.triangles {
            let [i0, i1, i2] = tri.map(|i| i as usize);
            let (Some(&p0), Some(&p1), Some(&p2)) =
                (self.vertices.get(i0), self.vertices.get(i1), self.vertices.get(i2))
            else {
                continue;
            };

            let face_normal = (p1 - p0).cross(p2 - p0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }

        self.normals = normals;
    }

    /// Unnormalized face normal of one triangle
    pub fn face_normal(&self, triangle: usize) -> Vec3 {
        let [a, b, c] = self.triangles[triangle].map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    /// Every index within bounds
    pub fn indices_valid(&self) -> bool {
        let len = self.vertices.len() as u32;
        self.triangles.iter().all(|tri| tri.iter().all(|&i| i < len))
    }

    pub fn bounds(&self) -> Bounds {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        if self.vertices.is_empty() {
            min = Vec3::ZERO;
            max = Vec3::ZERO;
        }
        Bounds { min, max }
    }

    /// Directed edges that are not matched by exactly one opposite edge.
    /// Zero means the mesh is closed and consistently wound.
    pub fn open_edge_count(&self) -> usize {
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for &[a, b, c] in &self.triangles {
            for edge in [(a, b), (b, c), (c, a)] {
                *directed.entry(edge).or_insert(0) += 1;
            }
        }

        directed
            .iter()
            .filter(|&(&(a, b), &count)| count != 1 || directed.get(&(b, a)) != Some(&1))
            .count()
    }

    /// Append another mesh after transforming it by `matrix`
    pub fn append_transformed(&mut self, other: &Mesh, matrix: Mat4) {
        let offset = self.vertices.len() as u32;
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();

        // Keep uv channel aligned once either side has one
        if self.uvs.is_some() || other.uvs.is_some() {
            let uvs = self.uvs.get_or_insert_with(|| vec![Vec2::ZERO; offset as usize]);
            match &other.uvs {
                Some(other_uvs) => uvs.extend_from_slice(other_uvs),
                None => uvs.extend(std::iter::repeat(Vec2::ZERO).take(other.vertices.len())),
            }
        }

        self.vertices
            .extend(other.vertices.iter().map(|v| matrix.transform_point3(*v)));
        self.normals.extend(
            other
                .normals
                .iter()
                .map(|n| (normal_matrix * *n).normalize_or_zero()),
        );
        // Meshes built without normals still get a slot per vertex
        self.normals.resize(self.vertices.len(), Vec3::ZERO);
        self.triangles
            .extend(other.triangles.iter().map(|tri| tri.map(|i| i + offset)));
    }

    /// Cylindrical projection around +Y: `u` from the azimuth, `v` from height
    pub fn apply_cylindrical_uvs(&mut self) {
        let height = self.bounds().size().y;
        let uvs = self
            .vertices
            .iter()
            .map(|v| {
                let u = v.x.atan2(v.z) / std::f32::consts::TAU;
                let v_coord = if height > 0.0 { v.y / height } else { 0.0 };
                Vec2::new(u, v_coord)
            })
            .collect();
        self.uvs = Some(uvs);
    }

    /// Interleaved vertex buffer and flat index buffer
    pub fn to_buffers(&self) -> (Vec<MeshVertex>, Vec<u32>) {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, p)| MeshVertex {
                position: p.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                uv: self
                    .uvs
                    .as_ref()
                    .and_then(|uvs| uvs.get(i))
                    .copied()
                    .unwrap_or(Vec2::ZERO)
                    .to_array(),
            })
            .collect();
        let indices = self.triangles.iter().flatten().copied().collect();
        (vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        // Outward winding
        let triangles = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        Mesh::new(vertices, triangles)
    }

    #[test]
    fn test_closed_mesh() {
        let mesh = tetrahedron();
        assert!(mesh.indices_valid());
        assert_eq!(mesh.open_edge_count(), 0);
        assert_eq!(mesh.normals.len(), 4);
    }

    #[test]
    fn test_open_mesh_detected() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert!(mesh.open_edge_count() > 0);
    }

    #[test]
    fn test_outward_normals() {
        let mesh = tetrahedron();
        let centroid = mesh.vertices.iter().copied().sum::<Vec3>() / 4.0;
        for (i, tri) in mesh.triangles.iter().enumerate() {
            let a = mesh.vertices[tri[0] as usize];
            assert!(mesh.face_normal(i).dot(a - centroid) > 0.0);
        }
    }

    #[test]
    fn test_bounds() {
        let b = tetrahedron().bounds();
        assert_eq!(b.size(), Vec3::ONE);
        assert_eq!(b.extents(), Vec3::splat(0.5));
        assert_eq!(Mesh::default().bounds().size(), Vec3::ZERO);
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut combined = tetrahedron();
        combined.append_transformed(&tetrahedron(), Mat4::from_translation(Vec3::X * 5.0));
        assert_eq!(combined.vertex_count(), 8);
        assert_eq!(combined.triangles[4], [4, 6, 5]);
        assert!(combined.indices_valid());
        assert_eq!(combined.normals.len(), 8);
        assert_eq!(combined.vertices[5], Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn test_buffers() {
        let mesh = tetrahedron();
        let (vertices, indices) = mesh.to_buffers();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 12);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 4 * std::mem::size_of::<MeshVertex>());
    }
}
