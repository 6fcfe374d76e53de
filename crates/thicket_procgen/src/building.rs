use glam::{Vec2, Vec3};
use thicket_core::error::{ensure_non_negative, ensure_positive};
use thicket_core::{ConfigError, Mesh};

/// Roof shape on top of the wall block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofStyle {
    /// Ridge running front to back
    Gabled,
    /// Slab with a raised skylight
    Flat,
}

/// Parameters for one building prefab
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecipe {
    pub name: &'static str,
    pub roof: RoofStyle,
    pub floors: u32,
    pub width: f32,
    pub depth: f32,
    pub floor_height: f32,
    pub roof_height: f32,
    pub chimney: bool,
}

impl Default for BuildingRecipe {
    fn default() -> Self {
        Self::cottage()
    }
}

impl BuildingRecipe {
    pub fn cottage() -> Self {
        BuildingRecipe {
            name: "cottage",
            roof: RoofStyle::Gabled,
            floors: 1,
            width: 5.0,
            depth: 4.0,
            floor_height: 2.5,
            roof_height: 1.5,
            chimney: true,
        }
    }

    pub fn townhouse() -> Self {
        BuildingRecipe {
            name: "townhouse",
            roof: RoofStyle::Gabled,
            floors: 2,
            width: 6.0,
            depth: 5.0,
            floor_height: 3.0,
            roof_height: 2.0,
            chimney: false,
        }
    }

    pub fn block() -> Self {
        BuildingRecipe {
            name: "block",
            roof: RoofStyle::Flat,
            floors: 3,
            width: 6.0,
            depth: 6.0,
            floor_height: 3.0,
            roof_height: 0.0,
            chimney: false,
        }
    }

    pub fn shed() -> Self {
        BuildingRecipe {
            name: "shed",
            roof: RoofStyle::Flat,
            floors: 1,
            width: 3.0,
            depth: 3.0,
            floor_height: 2.2,
            roof_height: 0.0,
            chimney: false,
        }
    }

    /// Every named preset, in a stable order
    pub fn catalogue() -> Vec<BuildingRecipe> {
        vec![Self::cottage(), Self::townhouse(), Self::block(), Self::shed()]
    }

    pub fn preset(name: &str) -> Option<BuildingRecipe> {
        Self::catalogue().into_iter().find(|r| r.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floors == 0 {
            return Err(ConfigError::InvalidCount { what: "building floors", min: 1, got: 0 });
        }
        ensure_positive("building width", self.width)?;
        ensure_positive("building depth", self.depth)?;
        ensure_positive("floor height", self.floor_height)?;
        ensure_non_negative("roof height", self.roof_height)
    }

    /// Radius of the footprint circle, used for spacing placed buildings
    pub fn footprint_radius(&self) -> f32 {
        Vec2::new(self.width, self.depth).length() * 0.5
    }

    /// Top of the wall block, where the roof starts
    pub fn eave_height(&self) -> f32 {
        FOUNDATION_HEIGHT + self.floors as f32 * self.floor_height
    }
}

const FOUNDATION_HEIGHT: f32 = 0.4;

/// Building split into one mesh per material
#[derive(Debug, Clone, Default)]
pub struct BuildingMesh {
    pub walls: Mesh,
    pub roof: Mesh,
    pub trim: Mesh,
}

impl BuildingMesh {
    pub const WALL_COLOR: [f32; 3] = [0.9, 0.88, 0.8];
    pub const ROOF_COLOR: [f32; 3] = [0.35, 0.15, 0.15];
    pub const TRIM_COLOR: [f32; 3] = [0.3, 0.3, 0.35];

    /// `(part, mesh, color)` for every non-empty part
    pub fn parts(&self) -> impl Iterator<Item = (&'static str, &Mesh, [f32; 3])> {
        [
            ("walls", &self.walls, Self::WALL_COLOR),
            ("roof", &self.roof, Self::ROOF_COLOR),
            ("trim", &self.trim, Self::TRIM_COLOR),
        ]
        .into_iter()
        .filter(|(_, mesh, _)| !mesh.is_empty())
    }
}

/// Build a prefab with its footprint centred on the origin and its base on `y = 0`
pub fn generate_building(recipe: &BuildingRecipe) -> Result<BuildingMesh, ConfigError> {
    recipe.validate()?;

    let mut walls = MeshBuilder::default();
    let mut roof = MeshBuilder::default();
    let mut trim = MeshBuilder::default();

    let half_w = recipe.width * 0.5;
    let half_d = recipe.depth * 0.5;
    let eave = recipe.eave_height();

    // Foundation
    trim.add_box(
        Vec3::new(0.0, FOUNDATION_HEIGHT * 0.5, 0.0),
        Vec3::new(recipe.width + 0.2, FOUNDATION_HEIGHT, recipe.depth + 0.2),
    );

    let wall_height = eave - FOUNDATION_HEIGHT;
    walls.add_box(
        Vec3::new(0.0, FOUNDATION_HEIGHT + wall_height * 0.5, 0.0),
        Vec3::new(recipe.width, wall_height, recipe.depth),
    );

    // Front windows, a door in the middle of the ground floor
    let window_spacing = 2.0;
    let windows = (recipe.width / window_spacing).floor() as i32 - 1;
    for floor in 0..recipe.floors {
        let y_base = FOUNDATION_HEIGHT + floor as f32 * recipe.floor_height;
        for w in 0..windows.max(0) {
            let x = -half_w + window_spacing * (w + 1) as f32;
            if floor == 0 && x.abs() < 1.0 {
                trim.add_box(Vec3::new(x, y_base + 1.0, half_d + 0.05), Vec3::new(1.0, 2.0, 0.1));
            } else {
                trim.add_box(Vec3::new(x, y_base + 1.5, half_d + 0.05), Vec3::new(1.0, 1.2, 0.1));
            }
        }
    }

    match recipe.roof {
        RoofStyle::Gabled => {
            let overhang = 0.4;
            roof.add_gable(
                Vec3::new(0.0, eave, 0.0),
                recipe.width + overhang * 2.0,
                recipe.depth + overhang * 2.0,
                recipe.roof_height.max(0.1),
            );
        }
        RoofStyle::Flat => {
            roof.add_box(
                Vec3::new(0.0, eave + 0.1, 0.0),
                Vec3::new(recipe.width + 0.4, 0.2, recipe.depth + 0.4),
            );
            trim.add_box(
                Vec3::new(0.0, eave + 0.3, 0.0),
                Vec3::new(half_w, 0.2, half_d),
            );
        }
    }

    if recipe.chimney {
        let height = eave + recipe.roof_height + 0.5;
        trim.add_box(Vec3::new(half_w - 1.0, height * 0.5, 0.0), Vec3::new(0.8, height, 0.8));
    }

    log::debug!(
        "Generated building '{}': {} floors, {:?} roof",
        recipe.name,
        recipe.floors,
        recipe.roof
    );

    Ok(BuildingMesh {
        walls: walls.finish(),
        roof: roof.finish(),
        trim: trim.finish(),
    })
}

/// Hard-edged mesh assembly: every face gets its own vertices
#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    uvs: Vec<Vec2>,
}

impl MeshBuilder {
    fn add_box(&mut self, center: Vec3, size: Vec3) {
        let h = size * 0.5;
        let p = [
            Vec3::new(-h.x, -h.y, h.z),  // front bottom left
            Vec3::new(h.x, -h.y, h.z),   // front bottom right
            Vec3::new(h.x, h.y, h.z),    // front top right
            Vec3::new(-h.x, h.y, h.z),   // front top left
            Vec3::new(-h.x, -h.y, -h.z), // back bottom left
            Vec3::new(h.x, -h.y, -h.z),  // back bottom right
            Vec3::new(h.x, h.y, -h.z),   // back top right
            Vec3::new(-h.x, h.y, -h.z),  // back top left
        ]
        .map(|v| center + v);

        self.add_quad(p[0], p[1], p[2], p[3]);
        self.add_quad(p[5], p[4], p[7], p[6]);
        self.add_quad(p[3], p[2], p[6], p[7]);
        self.add_quad(p[4], p[5], p[1], p[0]);
        self.add_quad(p[1], p[5], p[6], p[2]);
        self.add_quad(p[4], p[0], p[3], p[7]);
    }

    /// Triangular prism roof with its ridge along Z
    fn add_gable(&mut self, base_center: Vec3, width: f32, depth: f32, height: f32) {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let front_left = base_center + Vec3::new(-hw, 0.0, hd);
        let front_right = base_center + Vec3::new(hw, 0.0, hd);
        let back_left = base_center + Vec3::new(-hw, 0.0, -hd);
        let back_right = base_center + Vec3::new(hw, 0.0, -hd);
        let top_front = base_center + Vec3::new(0.0, height, hd);
        let top_back = base_center + Vec3::new(0.0, height, -hd);

        self.add_quad(front_left, top_front, top_back, back_left);
        self.add_quad(front_right, back_right, top_back, top_front);
        self.add_tri(front_left, front_right, top_front);
        self.add_tri(back_right, back_left, top_back);
        self.add_quad(back_left, back_right, front_right, front_left);
    }

    /// Corners counter-clockwise as seen from outside
    fn add_quad(&mut self, v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[v0, v1, v2, v3]);
        self.uvs.extend_from_slice(&[
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ]);
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
    }

    fn add_tri(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[v0, v1, v2]);
        self.uvs.extend_from_slice(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)]);
        self.triangles.push([base, base + 1, base + 2]);
    }

    fn finish(self) -> Mesh {
        Mesh::new(self.vertices, self.triangles).with_uvs(self.uvs)
    }
}
