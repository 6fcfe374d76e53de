//! Street grid turned into placed tiles, buildings and a ground plane

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thicket_core::error::ensure_finite;
use thicket_core::{ConfigError, GenRng, Mesh, SceneSink, Transform, WorldSeed};
use thicket_procgen::{
    generate_building, ground, ground_texture, BuildingMesh, BuildingRecipe, Texture, TileDims, TileKind, TileSet,
};

use crate::placement::PlacementRegistry;
use crate::streets::{CarveRules, CellType, StreetGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetConfig {
    pub seed: u64,
    pub grid_size: usize,
    pub cell_size: f32,
    pub road_width: f32,
    pub turn_segments: u32,
    pub secondary_probability: f32,
    pub termination_probability: f32,
    /// Number of street materials a tile can be assigned
    pub material_count: usize,
    /// Building preset names, see `BuildingRecipe::catalogue`
    pub prefabs: Vec<String>,
    pub ground_offset: f32,
    pub texture_size: u32,
    pub noise_scale: f32,
}

impl Default for StreetConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            grid_size: 8,
            cell_size: 10.0,
            road_width: 1.0,
            turn_segments: 16,
            secondary_probability: 0.3,
            termination_probability: 0.2,
            material_count: 3,
            prefabs: BuildingRecipe::catalogue()
                .iter()
                .map(|r| r.name.to_string())
                .collect(),
            ground_offset: -0.1,
            texture_size: 512,
            noise_scale: 20.0,
        }
    }
}

impl StreetConfig {
    pub fn tile_dims(&self) -> TileDims {
        TileDims {
            cell_size: self.cell_size,
            road_width: self.road_width,
            turn_segments: self.turn_segments,
        }
    }

    pub fn carve_rules(&self) -> CarveRules {
        CarveRules {
            secondary_probability: self.secondary_probability,
            termination_probability: self.termination_probability,
        }
    }

    /// Resolve prefab names against the building catalogue
    pub fn recipes(&self) -> Result<Vec<BuildingRecipe>, ConfigError> {
        if self.prefabs.is_empty() {
            return Err(ConfigError::EmptyCatalogue { what: "building prefabs" });
        }
        self.prefabs
            .iter()
            .map(|name| {
                BuildingRecipe::preset(name).ok_or_else(|| ConfigError::UnknownPreset {
                    what: "building",
                    name: name.clone(),
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::InvalidGrid(self.grid_size));
        }
        self.tile_dims().validate()?;
        if self.material_count == 0 {
            return Err(ConfigError::EmptyCatalogue { what: "street materials" });
        }
        for (what, p) in [
            ("secondary street probability", self.secondary_probability),
            ("street termination probability", self.termination_probability),
        ] {
            ensure_finite(what, p)?;
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidDimension { what, got: p });
            }
        }
        ensure_finite("ground offset", self.ground_offset)?;
        self.recipes().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub x: usize,
    pub z: usize,
    pub cell: CellType,
    pub kind: TileKind,
    pub transform: Transform,
    pub material: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBuilding {
    pub x: usize,
    pub z: usize,
    pub prefab: usize,
    pub yaw_degrees: i32,
    /// Non-uniform: `(s, s * height_factor, s)`
    pub transform: Transform,
    pub footprint_radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreetLayout {
    pub grid: StreetGrid,
    pub tiles: Vec<PlacedTile>,
    pub buildings: Vec<PlacedBuilding>,
    pub ground: Transform,
    pub ground_size: f32,
    /// Buildings dropped because they overlapped an earlier one
    pub skipped_buildings: usize,
}

/// Builds street layouts from a [`StreetConfig`], reusing tile and building meshes
pub struct StreetGenerator {
    config: StreetConfig,
    tiles: TileSet,
    recipes: Vec<BuildingRecipe>,
    buildings: Vec<BuildingMesh>,
    ground_mesh: Mesh,
    ground_texture: Option<Texture>,
    layout: Option<StreetLayout>,
}

impl StreetGenerator {
    pub fn new(config: StreetConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let tiles = TileSet::new(config.tile_dims())?;
        let recipes = config.recipes()?;
        let buildings = recipes
            .iter()
            .map(generate_building)
            .collect::<Result<Vec<_>, _>>()?;
        let size = config.grid_size as f32 * config.cell_size;
        let ground_mesh = ground(size, size)?;

        Ok(Self {
            config,
            tiles,
            recipes,
            buildings,
            ground_mesh,
            ground_texture: None,
            layout: None,
        })
    }

    pub fn config(&self) -> &StreetConfig {
        &self.config
    }

    pub fn layout(&self) -> Option<&StreetLayout> {
        self.layout.as_ref()
    }

    pub fn ground_texture(&self) -> Option<&Texture> {
        self.ground_texture.as_ref()
    }

    pub fn recipes(&self) -> &[BuildingRecipe] {
        &self.recipes
    }

    /// Tear down the current layout and build a new one from the seed
    pub fn regenerate(&mut self) -> Result<&StreetLayout, ConfigError> {
        self.layout = None;
        self.ground_texture = None;

        let mut rng = WorldSeed::new(self.config.seed).rng();
        let grid = StreetGrid::carve(self.config.grid_size, self.config.carve_rules(), &mut rng)?;
        let tiles = self.place_tiles(&grid, &mut rng);
        let (buildings, skipped) = self.place_buildings(&grid, &mut rng);

        let cell = self.config.cell_size;
        let center = (self.config.grid_size as f32 - 1.0) * cell * 0.5;
        let ground_transform = Transform::from_translation(Vec3::new(center, self.config.ground_offset, center));

        self.ground_texture = Some(ground_texture(
            self.config.texture_size,
            self.config.texture_size,
            self.config.noise_scale,
            self.config.seed as u32,
        )?);

        log::info!(
            "Generated {}x{} street grid: {} road cells, {} buildings ({} skipped)",
            grid.size(),
            grid.size(),
            grid.road_count(),
            buildings.len(),
            skipped
        );

        Ok(&*self.layout.insert(StreetLayout {
            grid,
            tiles,
            buildings,
            ground: ground_transform,
            ground_size: self.config.grid_size as f32 * cell,
            skipped_buildings: skipped,
        }))
    }

    fn place_tiles(&self, grid: &StreetGrid, rng: &mut GenRng) -> Vec<PlacedTile> {
        let cell_size = self.config.cell_size;
        grid.cells()
            .filter_map(|(x, z, cell)| {
                let kind = cell.tile_kind()?;
                let turns = grid.quarter_turns(x, z);
                let transform = Transform::from_translation(Vec3::new(x as f32 * cell_size, 0.0, z as f32 * cell_size))
                    .with_rotation(Quat::from_rotation_y(turns as f32 * FRAC_PI_2));
                Some(PlacedTile {
                    x,
                    z,
                    cell,
                    kind,
                    transform,
                    material: rng.index(self.config.material_count),
                })
            })
            .collect()
    }

    fn place_buildings(&self, grid: &StreetGrid, rng: &mut GenRng) -> (Vec<PlacedBuilding>, usize) {
        let cell_size = self.config.cell_size;
        let jitter = cell_size / 4.0;
        let mut registry = PlacementRegistry::new();
        let mut placed = Vec::new();
        let mut skipped = 0;

        for (x, z, cell) in grid.cells() {
            if cell.is_road() || !grid.is_adjacent_to_road(x, z) {
                continue;
            }

            let position = Vec3::new(
                x as f32 * cell_size + rng.range_f32(-jitter, jitter),
                0.0,
                z as f32 * cell_size + rng.range_f32(-jitter, jitter),
            );
            let prefab = rng.index(self.recipes.len());
            let yaw_degrees = rng.range_i32(0, 360);
            let scale = rng.range_f32(0.8, 1.2);
            let height_factor = rng.range_f32(1.0, 3.0);

            let footprint_radius = self.recipes[prefab].footprint_radius() * scale;
            if registry.overlaps(position, footprint_radius) {
                log::debug!("Building at ({x}, {z}) overlaps an earlier one, skipping");
                skipped += 1;
                continue;
            }
            registry.register(position, footprint_radius);

            placed.push(PlacedBuilding {
                x,
                z,
                prefab,
                yaw_degrees,
                transform: Transform::new(
                    position,
                    Quat::from_rotation_y((yaw_degrees as f32).to_radians()),
                    Vec3::new(scale, scale * height_factor, scale),
                ),
                footprint_radius,
            });
        }

        (placed, skipped)
    }

    /// Grey level of a street material
    pub fn material_color(&self, material: usize) -> [f32; 3] {
        let steps = self.config.material_count.max(1) as f32;
        let level = 0.25 + 0.3 * material as f32 / steps;
        [level, level, level]
    }

    pub fn emit(&self, sink: &mut dyn SceneSink) {
        let Some(layout) = &self.layout else {
            return;
        };

        sink.submit("ground", layout.ground.to_mat4(), &self.ground_mesh, [0.35, 0.3, 0.25]);

        for tile in &layout.tiles {
            let name = format!("street_{:?}", tile.kind).to_lowercase();
            sink.submit(
                &name,
                tile.transform.to_mat4(),
                self.tiles.get(tile.kind),
                self.material_color(tile.material),
            );
        }

        for building in &layout.buildings {
            let world: Mat4 = building.transform.to_mat4();
            for (part, mesh, color) in self.buildings[building.prefab].parts() {
                let name = format!("{}_{}", self.recipes[building.prefab].name, part);
                sink.submit(&name, world, mesh, color);
            }
        }
    }
}
