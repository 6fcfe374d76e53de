//! Flat street tiles in the XZ plane.
//!
//! Every tile is centred on the origin, lies on `y = 0` and faces +Y. Compass
//! directions are fixed as north = +Z and east = +X, and each tile is built in
//! one canonical orientation; [`TileKind`] documents which arms that is.
//! `Quat::from_rotation_y(90°)` turns north into east, east into south and so
//! on, so callers rotate tiles in quarter turns to match their neighbours.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use thicket_core::error::{ensure_positive, ensure_segments};
use thicket_core::{ConfigError, Mesh};

use crate::primitives::push_flat_quad;

/// Tile shapes and their canonical arms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// East-west
    Straight,
    /// North and east
    Turn,
    /// All four arms
    Intersection,
    /// Every arm except south
    TJunction,
    /// West only
    DeadEnd,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Straight,
        TileKind::Turn,
        TileKind::Intersection,
        TileKind::TJunction,
        TileKind::DeadEnd,
    ];

    /// Position in [`TileKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDims {
    pub cell_size: f32,
    pub road_width: f32,
    pub turn_segments: u32,
}

impl Default for TileDims {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            road_width: 1.0,
            turn_segments: 8,
        }
    }
}

impl TileDims {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("cell size", self.cell_size)?;
        ensure_positive("road width", self.road_width)?;
        ensure_segments("turn", self.turn_segments, 1)?;
        if self.road_width >= self.cell_size {
            return Err(ConfigError::InvalidDimension {
                what: "road width relative to cell size",
                got: self.road_width,
            });
        }
        Ok(())
    }

    fn half(&self) -> (f32, f32) {
        (self.cell_size * 0.5, self.road_width * 0.5)
    }
}

/// Builds a flat mesh from `(x, z)` corners and CCW quads
fn flat_mesh(dims: &TileDims, points: &[(f32, f32)], quads: &[[u32; 4]]) -> Mesh {
    let vertices: Vec<Vec3> = points.iter().map(|&(x, z)| Vec3::new(x, 0.0, z)).collect();
    let uvs = points
        .iter()
        .map(|&(x, z)| Vec2::new(x / dims.cell_size + 0.5, z / dims.cell_size + 0.5))
        .collect();

    let mut triangles = Vec::with_capacity(quads.len() * 2);
    for quad in quads {
        push_flat_quad(&mut triangles, *quad);
    }

    Mesh::new(vertices, triangles).with_uvs(uvs)
}

pub fn straight(dims: &TileDims) -> Result<Mesh, ConfigError> {
    dims.validate()?;
    let (h, w) = dims.half();
    Ok(flat_mesh(dims, &[(-h, -w), (h, -w), (h, w), (-h, w)], &[[0, 1, 2, 3]]))
}

pub fn intersection(dims: &TileDims) -> Result<Mesh, ConfigError> {
    dims.validate()?;
    let (h, w) = dims.half();
    let points = [
        (-h, -w), (-w, -w), (w, -w), (h, -w),
        (-h, w), (-w, w), (w, w), (h, w),
        (-w, -h), (w, -h), (-w, h), (w, h),
    ];
    let quads = [
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [8, 9, 2, 1],
        [5, 6, 11, 10],
    ];
    Ok(flat_mesh(dims, &points, &quads))
}

pub fn t_junction(dims: &TileDims) -> Result<Mesh, ConfigError> {
    dims.validate()?;
    let (h, w) = dims.half();
    let points = [
        (-h, -w), (-w, -w), (w, -w), (h, -w),
        (-h, w), (-w, w), (w, w), (h, w),
        (-w, h), (w, h),
    ];
    let quads = [[0, 1, 5, 4], [1, 2, 6, 5], [2, 3, 7, 6], [5, 6, 9, 8]];
    Ok(flat_mesh(dims, &points, &quads))
}

/// Road from the west edge ending just past the centre
pub fn dead_end(dims: &TileDims) -> Result<Mesh, ConfigError> {
    dims.validate()?;
    let (h, w) = dims.half();
    Ok(flat_mesh(dims, &[(-h, -w), (w, -w), (w, w), (-h, w)], &[[0, 1, 2, 3]]))
}

/// Quarter arc joining the north and east edges, centred on the north-east corner
pub fn turn(dims: &TileDims) -> Result<Mesh, ConfigError> {
    dims.validate()?;
    let (h, w) = dims.half();
    let (inner, outer) = (h - w, h + w);
    let segments = dims.turn_segments;

    let mut points = Vec::with_capacity((segments as usize + 1) * 2);
    for i in 0..=segments {
        let angle = i as f32 / segments as f32 * FRAC_PI_2;
        let (dx, dz) = (-angle.sin(), -angle.cos());
        points.push((h + dx * inner, h + dz * inner));
        points.push((h + dx * outer, h + dz * outer));
    }

    let quads: Vec<[u32; 4]> = (0..segments)
        .map(|i| {
            let (inner_i, outer_i) = (i * 2, i * 2 + 1);
            let (inner_next, outer_next) = (i * 2 + 2, i * 2 + 3);
            [outer_next, outer_i, inner_i, inner_next]
        })
        .collect();

    Ok(flat_mesh(dims, &points, &quads))
}

pub fn tile(kind: TileKind, dims: &TileDims) -> Result<Mesh, ConfigError> {
    match kind {
        TileKind::Straight => straight(dims),
        TileKind::Turn => turn(dims),
        TileKind::Intersection => intersection(dims),
        TileKind::TJunction => t_junction(dims),
        TileKind::DeadEnd => dead_end(dims),
    }
}

/// Ground plane of `width` by `depth` centred on the origin, facing +Y
pub fn ground(width: f32, depth: f32) -> Result<Mesh, ConfigError> {
    ensure_positive("ground width", width)?;
    ensure_positive("ground depth", depth)?;

    let (hw, hd) = (width * 0.5, depth * 0.5);
    let vertices = vec![
        Vec3::new(-hw, 0.0, -hd),
        Vec3::new(hw, 0.0, -hd),
        Vec3::new(hw, 0.0, hd),
        Vec3::new(-hw, 0.0, hd),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let mut triangles = Vec::with_capacity(2);
    push_flat_quad(&mut triangles, [0, 1, 2, 3]);

    Ok(Mesh::new(vertices, triangles).with_uvs(uvs))
}

/// One mesh per tile kind, built once and shared by every placed tile
#[derive(Debug, Clone)]
pub struct TileSet {
    pub dims: TileDims,
    /// One mesh per kind, in [`TileKind::ALL`] order
    meshes: Vec<Mesh>,
}

impl TileSet {
    pub fn new(dims: TileDims) -> Result<Self, ConfigError> {
        let meshes = TileKind::ALL
            .iter()
            .map(|&kind| tile(kind, &dims))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Built tile set: cell {} road {} turn segments {}",
            dims.cell_size,
            dims.road_width,
            dims.turn_segments
        );
        Ok(Self { dims, meshes })
    }

    pub fn get(&self, kind: TileKind) -> &Mesh {
        &self.meshes[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(mesh: &Mesh) -> f32 {
        (0..mesh.triangle_count())
            .map(|i| mesh.face_normal(i).length() * 0.5)
            .sum()
    }

    /// Does the tile touch the middle of the given edge?
    fn reaches(mesh: &Mesh, edge: Vec3, half: f32) -> bool {
        mesh.vertices
            .iter()
            .any(|v| (v.dot(edge) - half).abs() < 1e-4 && (*v - edge * half).length() <= 1.0)
    }

    #[test]
    fn test_tiles_face_up() {
        let dims = TileDims::default();
        for kind in TileKind::ALL {
            let mesh = tile(kind, &dims).unwrap();
            assert!(mesh.indices_valid());
            for i in 0..mesh.triangle_count() {
                assert!(mesh.face_normal(i).y > 0.0, "{kind:?} triangle {i} faces down");
            }
            assert!(mesh.vertices.iter().all(|v| v.y == 0.0));
        }
    }

    #[test]
    fn test_tile_areas() {
        let dims = TileDims::default();
        let (c, w) = (dims.cell_size, dims.road_width);
        let h = c * 0.5;

        assert!((area(&straight(&dims).unwrap()) - c * w).abs() < 1e-3);
        assert!((area(&intersection(&dims).unwrap()) - (2.0 * c * w - w * w)).abs() < 1e-3);
        assert!((area(&t_junction(&dims).unwrap()) - (c * w + (h - w * 0.5) * w)).abs() < 1e-3);
        assert!((area(&dead_end(&dims).unwrap()) - (h + w * 0.5) * w).abs() < 1e-3);

        // Polygonal quarter annulus approaches pi * h * w from below
        let turn_area = area(&turn(&TileDims { turn_segments: 32, ..dims }).unwrap());
        let exact = std::f32::consts::PI * h * (w * 0.5);
        assert!(turn_area < exact && turn_area > exact * 0.99);
    }

    #[test]
    fn test_canonical_arms() {
        let dims = TileDims::default();
        let h = dims.cell_size * 0.5;
        let (north, east, south, west) = (Vec3::Z, Vec3::X, -Vec3::Z, -Vec3::X);

        let turn = turn(&dims).unwrap();
        assert!(reaches(&turn, north, h) && reaches(&turn, east, h));
        assert!(!reaches(&turn, south, h) && !reaches(&turn, west, h));

        let t = t_junction(&dims).unwrap();
        assert!(reaches(&t, north, h) && reaches(&t, east, h) && reaches(&t, west, h));
        assert!(!reaches(&t, south, h));

        let end = dead_end(&dims).unwrap();
        assert!(reaches(&end, west, h) && !reaches(&end, east, h));
    }

    #[test]
    fn test_invalid_dims() {
        let dims = TileDims { road_width: 12.0, ..TileDims::default() };
        assert!(straight(&dims).is_err());
        let dims = TileDims { turn_segments: 0, ..TileDims::default() };
        assert!(TileSet::new(dims).is_err());
        assert!(ground(0.0, 1.0).is_err());
    }

    #[test]
    fn test_tile_set() {
        let set = TileSet::new(TileDims::default()).unwrap();
        assert_eq!(set.get(TileKind::Intersection).triangle_count(), 10);
        assert_eq!(set.get(TileKind::Straight).triangle_count(), 2);

        for (i, kind) in TileKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
            let expected = tile(kind, &set.dims).unwrap();
            assert_eq!(set.get(kind), &expected, "{kind:?}");
        }
    }

    #[test]
    fn test_ground_uvs() {
        let mesh = ground(30.0, 30.0).unwrap();
        assert_eq!(mesh.uvs.as_ref().map(Vec::len), Some(4));
        assert!(mesh.face_normal(0).y > 0.0);
    }
}
