//! Recursive trees and bushes.
//!
//! A tree is a bark trunk carrying a few straight offshoots and a whorl of
//! curved main branches; a bush is a fan of curved branches at ground level.
//! Each branch is sized from its parent, positioned on the parent's surface
//! and rejected together with its whole subtree when its attachment point
//! lands on one already claimed inside the same plant.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thicket_core::error::{ensure_non_negative, ensure_positive, ensure_segments};
use thicket_core::math::{hsv_to_rgb, lerp};
use thicket_core::{ConfigError, GenRng, Mesh, SceneSink, Transform, WorldSeed};
use thicket_procgen::{bark_trunk, bush_texture, cylinder, BranchShape, Texture};

use crate::placement::PlacementRegistry;

/// Uniform scale falloff per recursion depth
const SCALE_FALLOFF: f32 = 0.7;
/// Sub-seed layer for plants in a field
const PLANT_LAYER: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub seed: u64,
    pub count: usize,
    /// Radius of the circle the plants are spread on
    pub spacing: f32,
    pub trunk_radius: f32,
    pub trunk_height: f32,
    pub trunk_segments: u32,
    pub bark_depth: f32,
    pub branch_segments: u32,
    pub curve_steps: u32,
    /// Total arc angle of a curved branch, radians
    pub bend: f32,
    pub tree_max_order: u32,
    pub bush_max_order: u32,
    pub offshoot_max_order: u32,
    /// Attachment points closer than `factor * branch radius` collide
    pub collision_factor: f32,
    /// Edge length of the noise texture on bush main branches
    pub texture_size: u32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            count: 3,
            spacing: 5.0,
            trunk_radius: 0.5,
            trunk_height: 6.0,
            trunk_segments: 16,
            bark_depth: 0.1,
            branch_segments: BranchShape::DEFAULT_SEGMENTS,
            curve_steps: BranchShape::DEFAULT_CURVE_STEPS,
            bend: BranchShape::DEFAULT_BEND,
            tree_max_order: 4,
            bush_max_order: 3,
            offshoot_max_order: 2,
            collision_factor: 0.5,
            texture_size: 256,
        }
    }
}

impl PlantConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("plant spacing", self.spacing)?;
        ensure_positive("trunk radius", self.trunk_radius)?;
        ensure_positive("trunk height", self.trunk_height)?;
        ensure_segments("trunk", self.trunk_segments, 3)?;
        ensure_non_negative("bark depth", self.bark_depth)?;
        ensure_segments("branch", self.branch_segments, 3)?;
        ensure_segments("branch curve steps", self.curve_steps, 1)?;
        ensure_non_negative("collision factor", self.collision_factor)?;
        ensure_segments("bush texture size", self.texture_size, 1)?;
        if !self.bend.is_finite() {
            return Err(ConfigError::NonFinite { what: "branch bend" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantKind {
    Tree,
    Bush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Trunk,
    /// Straight side shoot growing out of the trunk
    Offshoot,
    /// Curved limb
    Limb,
}

/// One branch and everything that grows from it
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub role: BranchRole,
    pub order: u32,
    /// Relative to the parent branch (or the plant for root branches)
    pub transform: Transform,
    pub mesh: Mesh,
    pub color: [f32; 3],
    /// Noise texture, only on the main branches of a bush
    pub texture: Option<Texture>,
    pub children: Vec<BranchNode>,
}

impl BranchNode {
    /// Branches in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(BranchNode::count).sum::<usize>()
    }

    pub fn max_order(&self) -> u32 {
        self.children
            .iter()
            .map(BranchNode::max_order)
            .max()
            .unwrap_or(0)
            .max(self.order)
    }

    /// Depth-first visit with each node's plant-space matrix
    pub fn walk(&self, parent: Mat4, visit: &mut dyn FnMut(&BranchNode, Mat4)) {
        let world = parent * self.transform.to_mat4();
        visit(self, world);
        for child in &self.children {
            child.walk(world, visit);
        }
    }

    pub fn emit(&self, parent: Mat4, sink: &mut dyn SceneSink) {
        self.walk(parent, &mut |node, world| {
            let name = match node.role {
                BranchRole::Trunk => "trunk".to_string(),
                BranchRole::Offshoot => format!("offshoot_order{}", node.order),
                BranchRole::Limb => format!("branch_order{}", node.order),
            };
            sink.submit(&name, world, &node.mesh, node.color);
        });
    }
}

/// Counters collected while growing one plant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthStats {
    pub placed: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub kind: PlantKind,
    pub transform: Transform,
    pub branches: Vec<BranchNode>,
    pub stats: GrowthStats,
}

impl Plant {
    /// Grow one plant at `position` from the given random stream
    pub fn grow(kind: PlantKind, position: Vec3, config: &PlantConfig, rng: &mut GenRng) -> Result<Plant, ConfigError> {
        let mut grower = Grower {
            config,
            rng,
            registry: PlacementRegistry::new(),
            stats: GrowthStats::default(),
        };

        let branches = match kind {
            PlantKind::Tree => vec![grower.tree()?],
            PlantKind::Bush => grower.bush()?,
        };

        Ok(Plant {
            kind,
            transform: Transform::from_translation(position),
            branches,
            stats: grower.stats,
        })
    }

    pub fn branch_count(&self) -> usize {
        self.branches.iter().map(BranchNode::count).sum()
    }

    pub fn max_order(&self) -> u32 {
        self.branches.iter().map(BranchNode::max_order).max().unwrap_or(0)
    }

    pub fn emit(&self, sink: &mut dyn SceneSink) {
        let root = self.transform.to_mat4();
        for branch in &self.branches {
            branch.emit(root, sink);
        }
    }
}

struct Grower<'a> {
    config: &'a PlantConfig,
    rng: &'a mut GenRng,
    registry: PlacementRegistry,
    stats: GrowthStats,
}

impl Grower<'_> {
    fn branch_color(&mut self, order: u32) -> [f32; 3] {
        let hue = self.rng.range_f32(0.0, 0.3);
        let level = 0.5 + order as f32 * 0.1;
        hsv_to_rgb(hue, level, level)
    }

    fn shape(&self, order: u32, parent_radius: f32) -> BranchShape {
        BranchShape::for_order(order, parent_radius)
            .with_bend(self.config.bend)
            .with_resolution(self.config.branch_segments, self.config.curve_steps)
    }

    /// Claim the attachment point or report a collision
    fn claim(&mut self, point: Vec3, radius: f32, order: u32) -> bool {
        let epsilon = radius * self.config.collision_factor;
        if self.registry.collides(point, epsilon) {
            log::debug!("Collision at {point:?}, skipping order {order} branch");
            self.stats.discarded += 1;
            return false;
        }
        self.registry.register(point, radius);
        self.stats.placed += 1;
        true
    }

    fn tree(&mut self) -> Result<BranchNode, ConfigError> {
        let color = self.branch_color(0);
        let mesh = bark_trunk(
            self.config.trunk_radius,
            self.config.trunk_height,
            self.config.trunk_segments,
            self.config.bark_depth,
        )?;
        let bounds = mesh.bounds();
        let trunk_height = bounds.size().y;
        let trunk_radius = bounds.extents().x;
        self.stats.placed += 1;

        let mut trunk = BranchNode {
            role: BranchRole::Trunk,
            order: 0,
            transform: Transform::IDENTITY,
            mesh,
            color,
            texture: None,
            children: Vec::new(),
        };

        if self.config.offshoot_max_order > 0 {
            let offshoots = self.rng.range_i32(2, 5);
            for _ in 0..offshoots {
                if let Some(offshoot) = self.offshoot(1, Mat4::IDENTITY)? {
                    trunk.children.push(offshoot);
                }
            }
        }

        let main_branches = self.rng.range_i32(4, 8);
        for i in 0..main_branches {
            let t = i as f32 / (main_branches - 1) as f32;
            let height = lerp(trunk_height * 0.6, trunk_height * 0.9, t);
            let angle = i as f32 * (360.0 / main_branches as f32);
            let attach = Vec3::Y * height;
            if let Some(limb) = self.tree_limb(1, attach, trunk_radius, angle, Mat4::IDENTITY)? {
                trunk.children.push(limb);
            }
        }

        log::debug!(
            "Tree with {} main branches, {} branches total",
            main_branches,
            trunk.count()
        );
        Ok(trunk)
    }

    /// Straight shoot tilted at random from the middle of its parent
    fn offshoot(&mut self, order: u32, parent: Mat4) -> Result<Option<BranchNode>, ConfigError> {
        let color = self.branch_color(order);
        let radius = 0.2 * 0.6_f32.powi(order as i32);
        let height = 3.0 * SCALE_FALLOFF.powi(order as i32);
        let mesh = cylinder(radius, height, self.config.trunk_segments)?;
        let bounds = mesh.bounds();

        let x = self.rng.range_f32(-30.0, 30.0).to_radians();
        let y = self.rng.range_f32(0.0, 360.0).to_radians();
        let z = self.rng.range_f32(-30.0, 30.0).to_radians();

        let scale = SCALE_FALLOFF.powi(order as i32);
        let transform = Transform::new(
            Vec3::Y * bounds.size().y * 0.5,
            Quat::from_euler(EulerRot::YXZ, y, x, z),
            Vec3::splat(scale),
        );
        let world = parent * transform.to_mat4();

        if !self.claim(world.transform_point3(Vec3::ZERO), bounds.extents().x, order) {
            return Ok(None);
        }

        let mut node = BranchNode {
            role: BranchRole::Offshoot,
            order,
            transform,
            mesh,
            color,
            texture: None,
            children: Vec::new(),
        };

        if order < self.config.offshoot_max_order {
            let children = self.rng.range_i32(2, 5);
            for _ in 0..children {
                if let Some(child) = self.offshoot(order + 1, world)? {
                    node.children.push(child);
                }
            }
        }

        Ok(Some(node))
    }

    fn tree_limb(
        &mut self,
        order: u32,
        attach: Vec3,
        parent_radius: f32,
        angle: f32,
        parent: Mat4,
    ) -> Result<Option<BranchNode>, ConfigError> {
        let color = self.branch_color(order);
        let shape = self.shape(order, parent_radius);
        let mesh = shape.build()?;

        let scale = SCALE_FALLOFF.powi(order as i32);
        let adjusted_radius = parent_radius * scale;
        let yaw = Quat::from_rotation_y(angle.to_radians());
        let position = attach + yaw * Vec3::Z * adjusted_radius;

        if !self.claim(parent.transform_point3(position), adjusted_radius, order) {
            return Ok(None);
        }

        let tilt = if order == 1 {
            self.rng.range_f32(30.0, 60.0)
        } else {
            self.rng.range_f32(15.0, 45.0)
        };
        let transform = Transform::new(
            position,
            yaw * Quat::from_rotation_x(tilt.to_radians()),
            Vec3::splat(scale),
        );
        let world = parent * transform.to_mat4();

        let mut node = BranchNode {
            role: BranchRole::Limb,
            order,
            transform,
            mesh,
            color,
            texture: None,
            children: Vec::new(),
        };

        if order < self.config.tree_max_order {
            let children = self.rng.range_i32(2, 4);
            for i in 0..children {
                let t = (i + 1) as f32 / (children + 1) as f32;
                let (attach, _, _) = shape.frame_at(t);
                let angle = i as f32 * (360.0 / children as f32);
                if let Some(child) = self.tree_limb(order + 1, attach, shape.base_radius, angle, world)? {
                    node.children.push(child);
                }
            }
        }

        Ok(Some(node))
    }

    fn bush(&mut self) -> Result<Vec<BranchNode>, ConfigError> {
        let main_branches = self.rng.range_i32(5, 10);
        let mut branches = Vec::with_capacity(main_branches as usize);
        for i in 0..main_branches {
            let angle = i as f32 * (360.0 / main_branches as f32);
            if let Some(branch) = self.bush_limb(0, Vec3::ZERO, 0.5, angle, Mat4::IDENTITY)? {
                branches.push(branch);
            }
        }
        log::debug!("Bush with {} main branches", main_branches);
        Ok(branches)
    }

    fn bush_limb(
        &mut self,
        order: u32,
        attach: Vec3,
        parent_radius: f32,
        angle: f32,
        parent: Mat4,
    ) -> Result<Option<BranchNode>, ConfigError> {
        let color = self.branch_color(order);
        let shape = self.shape(order, parent_radius);
        let mut mesh = shape.build()?;
        if order == 0 {
            mesh.apply_cylindrical_uvs();
        }

        let scale = SCALE_FALLOFF.powi(order as i32);
        let adjusted_radius = parent_radius * scale;
        let yaw = Quat::from_rotation_y(angle.to_radians());
        let position = attach + yaw * Vec3::Z * adjusted_radius;

        if !self.claim(parent.transform_point3(position), adjusted_radius, order) {
            return Ok(None);
        }

        // Orthotropic shoots keep growing upward, plagiotropic ones lean out.
        // The branch only turns halfway from its parent's axis to the target.
        let orthotropic = self.rng.value() < 0.5;
        let tilt = Quat::from_rotation_x(self.rng.range_f32(30.0, 60.0).to_radians());
        let lean = if orthotropic {
            tilt
        } else {
            Quat::from_rotation_x(FRAC_PI_2) * tilt
        };
        let transform = Transform::new(
            position,
            yaw * Quat::IDENTITY.slerp(lean, 0.5),
            Vec3::splat(scale),
        );
        let world = parent * transform.to_mat4();

        let texture = if order == 0 {
            Some(bush_texture(self.config.texture_size, self.rng.next_seed() as u32)?)
        } else {
            None
        };

        let mut node = BranchNode {
            role: BranchRole::Limb,
            order,
            transform,
            mesh,
            color,
            texture,
            children: Vec::new(),
        };

        if order < self.config.bush_max_order {
            let children = self.rng.range_i32(2, 5);
            for i in 0..children {
                let t = (i + 1) as f32 / (children + 1) as f32;
                let (attach, _, _) = shape.frame_at(t);
                let angle = i as f32 * (360.0 / children as f32);
                if let Some(child) = self.bush_limb(order + 1, attach, shape.base_radius, angle, world)? {
                    node.children.push(child);
                }
            }
        }

        Ok(Some(node))
    }
}

/// Field of plants laid out on a circle, rebuilt from the configured seed
#[derive(Debug, Clone)]
pub struct PlantGenerator {
    config: PlantConfig,
    plants: Vec<Plant>,
}

impl PlantGenerator {
    pub fn new(config: PlantConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            plants: Vec::new(),
        })
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Drop the current field and grow a new one from the seed
    pub fn regenerate(&mut self) -> Result<&[Plant], ConfigError> {
        self.plants.clear();

        let field_seed = WorldSeed::new(self.config.seed);
        let count = self.config.count;
        let mut plants = Vec::with_capacity(count);
        for i in 0..count {
            let angle = i as f32 * (360.0 / count as f32);
            let position = Quat::from_rotation_y(angle.to_radians()) * Vec3::Z * self.config.spacing;
            let mut rng = field_seed.for_object(PLANT_LAYER, i as u64).rng();
            let kind = if rng.value() > 0.5 { PlantKind::Tree } else { PlantKind::Bush };
            let plant = Plant::grow(kind, position, &self.config, &mut rng)?;
            log::debug!(
                "Created {:?} at {:?} ({} branches, {} discarded)",
                kind,
                position,
                plant.branch_count(),
                plant.stats.discarded
            );
            plants.push(plant);
        }

        log::info!("Generated {} plants from seed {}", count, self.config.seed);
        self.plants = plants;
        Ok(&self.plants)
    }

    pub fn emit(&self, sink: &mut dyn SceneSink) {
        for plant in &self.plants {
            plant.emit(sink);
        }
    }
}
