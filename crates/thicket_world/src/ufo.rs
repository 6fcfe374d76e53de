//! UFO fleet assembled from revolution bodies and small primitives.
//!
//! Every UFO rebuilds from its own sub-seed, hashed from the fleet seed and
//! its index, so adding variants to one ship never shifts the parts of the next.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thicket_core::error::{ensure_finite, ensure_positive, ensure_segments};
use thicket_core::math::{bezier_point, hsv_to_rgb, lerp};
use thicket_core::{ConfigError, GenRng, Mesh, SceneNode, SceneSink, Transform, WorldSeed};
use thicket_procgen::{
    add_bottom_cap, annulus, bezier_revolution, cone, cylinder, hemisphere, holographic_texture, icosphere, quad,
    Texture,
};

/// Saucer profile, revolved around +Y
pub const BODY_PROFILE: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.5, 0.0),
    Vec3::new(2.0, 0.5, 0.0),
    Vec3::new(3.0, 0.0, 0.0),
];

const COCKPIT_RADIUS: f32 = 0.8;
const LIGHT_COUNT: u32 = 8;
const LIGHT_RING_RADIUS: f32 = 1.5;
const RIVET_COUNT: u32 = 16;
const GRAY: [f32; 3] = [0.5, 0.5, 0.5];
/// Sub-seed layer for fleet members
const UFO_LAYER: u64 = 2;
const EXHAUST_COLOR: [f32; 3] = [0.0, 0.8, 1.0];
const HOLOGRAM_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoConfig {
    pub seed: u64,
    pub count: usize,
    /// Distance between neighbouring UFOs along +X
    pub spacing: f32,
    /// X of the first UFO
    pub row_start: f32,
    pub hover_height: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub body_segments: u32,
    /// Rotation speed of the ring variant, degrees per second
    pub ring_speed: f32,
    pub pulse_speed: f32,
    pub texture_size: u32,
}

impl Default for UfoConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            count: 5,
            spacing: 5.0,
            row_start: -15.0,
            hover_height: 1.5,
            min_scale: 0.8,
            max_scale: 1.2,
            body_segments: 32,
            ring_speed: 30.0,
            pulse_speed: 1.0,
            texture_size: 256,
        }
    }
}

impl UfoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("UFO spacing", self.spacing)?;
        ensure_finite("UFO row start", self.row_start)?;
        ensure_finite("UFO hover height", self.hover_height)?;
        ensure_positive("UFO min scale", self.min_scale)?;
        ensure_positive("UFO max scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::InvalidDimension {
                what: "UFO scale range",
                got: self.max_scale - self.min_scale,
            });
        }
        ensure_segments("UFO body", self.body_segments, 3)?;
        ensure_finite("UFO ring speed", self.ring_speed)?;
        ensure_finite("UFO pulse speed", self.pulse_speed)?;
        Ok(())
    }
}

/// Extra parts a UFO receives, chosen by its index in the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UfoVariant {
    LandingGear,
    SpikesAndExhaust,
    LayersAndRing,
    GearSpikesAndPulse,
    LayersSpikesAndHologram,
}

impl UfoVariant {
    pub fn for_index(index: usize) -> Self {
        match index % 5 {
            0 => UfoVariant::LandingGear,
            1 => UfoVariant::SpikesAndExhaust,
            2 => UfoVariant::LayersAndRing,
            3 => UfoVariant::GearSpikesAndPulse,
            _ => UfoVariant::LayersSpikesAndHologram,
        }
    }

    pub fn landing_gear(self) -> bool {
        matches!(self, UfoVariant::LandingGear | UfoVariant::GearSpikesAndPulse)
    }

    pub fn spikes(self) -> bool {
        matches!(
            self,
            UfoVariant::SpikesAndExhaust | UfoVariant::GearSpikesAndPulse | UfoVariant::LayersSpikesAndHologram
        )
    }

    pub fn layers(self) -> bool {
        matches!(self, UfoVariant::LayersAndRing | UfoVariant::LayersSpikesAndHologram)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ufo {
    pub index: usize,
    /// Sub-seed derived from the fleet seed and `index`
    pub seed: WorldSeed,
    pub variant: UfoVariant,
    pub body_scale: f32,
    pub root: SceneNode,
    pub hologram: Option<Texture>,
    /// Base colours of the pulsing lights, in child order
    pulse_colors: Vec<[f32; 3]>,
}

impl Ufo {
    pub fn part(&self, name: &str) -> Option<&SceneNode> {
        self.root.children.iter().find(|n| n.name == name)
    }

    pub fn parts_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.root.children.iter().filter(move |n| n.name == name)
    }

    /// Spin the ring and pulse the lights to their state at `time` seconds
    pub fn animate(&mut self, time: f32, ring_speed: f32, pulse_speed: f32) {
        let intensity = lerp(0.5, 1.0, ping_pong(time * pulse_speed));
        let mut pulse = self.pulse_colors.iter();

        for node in &mut self.root.children {
            match node.name.as_str() {
                "ring" => {
                    node.transform.rotation = Quat::from_rotation_y((ring_speed * time).to_radians());
                }
                "pulse_light" => {
                    if let Some(base) = pulse.next() {
                        node.color = base.map(|c| c * intensity);
                    }
                }
                _ => {}
            }
        }
    }
}

fn ping_pong(t: f32) -> f32 {
    let t = t.rem_euclid(2.0);
    if t > 1.0 {
        2.0 - t
    } else {
        t
    }
}

fn random_color(rng: &mut GenRng, min: f32, max: f32) -> [f32; 3] {
    [rng.range_f32(min, max), rng.range_f32(min, max), rng.range_f32(min, max)]
}

/// Saturated random colour, hue anywhere, saturation and value in `[0.5, 1)`
fn random_vivid(rng: &mut GenRng) -> [f32; 3] {
    let h = rng.value();
    let s = rng.range_f32(0.5, 1.0);
    let v = rng.range_f32(0.5, 1.0);
    hsv_to_rgb(h, s, v)
}

fn around(angle: f32, radius: f32, height: f32) -> Vec3 {
    Quat::from_rotation_y(angle) * Vec3::Z * radius + Vec3::Y * height
}

/// Shared part meshes; every UFO reuses them with its own transforms.
struct UfoParts {
    body: Mesh,
    cockpit: Mesh,
    lights: Mesh,
    antenna: Mesh,
    rivet: Mesh,
    leg: Mesh,
    spike: Mesh,
    exhaust: Mesh,
    ring: Mesh,
    pulse_light: Mesh,
    display: Mesh,
}

impl UfoParts {
    fn build(config: &UfoConfig) -> Result<Self, ConfigError> {
        let mut body = bezier_revolution(&BODY_PROFILE, config.body_segments)?;
        add_bottom_cap(&mut body, config.body_segments)?;

        let light = icosphere(0.1, 0)?;
        let mut lights = Mesh::default();
        for i in 0..LIGHT_COUNT {
            let angle = i as f32 / LIGHT_COUNT as f32 * TAU;
            let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * LIGHT_RING_RADIUS;
            lights.append_transformed(&light, Mat4::from_translation(offset));
        }

        Ok(Self {
            body,
            cockpit: hemisphere(COCKPIT_RADIUS, 16, 8)?,
            lights,
            antenna: cone(0.1, 1.0, 8)?,
            rivet: icosphere(0.05, 1)?,
            leg: cylinder(0.05, 1.0, 8)?,
            spike: cylinder(0.05, 0.5, 8)?,
            exhaust: quad(0.1, 1.0)?,
            ring: annulus(1.0, 0.1, 32)?,
            pulse_light: icosphere(0.1, 1)?,
            display: quad(2.0, 1.0)?,
        })
    }
}

pub struct UfoGenerator {
    config: UfoConfig,
    parts: UfoParts,
    fleet: Vec<Ufo>,
}

impl UfoGenerator {
    pub fn new(config: UfoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let parts = UfoParts::build(&config)?;
        Ok(Self {
            config,
            parts,
            fleet: Vec::new(),
        })
    }

    pub fn config(&self) -> &UfoConfig {
        &self.config
    }

    pub fn fleet(&self) -> &[Ufo] {
        &self.fleet
    }

    pub fn regenerate(&mut self) -> Result<&[Ufo], ConfigError> {
        self.fleet.clear();

        let fleet_seed = WorldSeed::new(self.config.seed);
        for index in 0..self.config.count {
            let seed = fleet_seed.for_object(UFO_LAYER, index as u64);
            let ufo = self.assemble(index, seed)?;
            self.fleet.push(ufo);
        }

        log::info!("Generated {} UFOs", self.fleet.len());
        Ok(&self.fleet)
    }

    /// Advance ring spin and light pulses of the whole fleet
    pub fn animate(&mut self, time: f32) {
        let (ring_speed, pulse_speed) = (self.config.ring_speed, self.config.pulse_speed);
        for ufo in &mut self.fleet {
            ufo.animate(time, ring_speed, pulse_speed);
        }
    }

    pub fn emit(&self, sink: &mut dyn SceneSink) {
        for ufo in &self.fleet {
            ufo.root.emit(Mat4::IDENTITY, sink);
        }
    }

    fn assemble(&self, index: usize, seed: WorldSeed) -> Result<Ufo, ConfigError> {
        let parts = &self.parts;
        let mut rng = seed.rng();
        let variant = UfoVariant::for_index(index);

        let body_scale = rng.range_f32(self.config.min_scale, self.config.max_scale);
        let cockpit_scale = rng.range_f32(0.5, 1.0);
        let lights_scale = rng.range_f32(0.5, 1.0);
        let antenna_scale = rng.range_f32(0.5, 1.0);

        let body_color = random_color(&mut rng, 0.2, 0.4);
        let cockpit_color = random_color(&mut rng, 0.4, 0.6);
        let lights_color = random_color(&mut rng, 0.8, 1.0);
        let antenna_color = random_color(&mut rng, 0.2, 0.4);

        // Rim and crown of the scaled saucer
        let rim = BODY_PROFILE[3].x * body_scale;
        let crown = bezier_point(0.5, &BODY_PROFILE) * body_scale;

        let position = Vec3::new(
            index as f32 * self.config.spacing + self.config.row_start,
            self.config.hover_height,
            0.0,
        );
        let mut root = SceneNode::group(format!("ufo_{index}"), Transform::from_translation(position));

        root.push(SceneNode::with_mesh(
            "body",
            Transform::IDENTITY.with_scale(Vec3::splat(body_scale)),
            parts.body.clone(),
            body_color,
        ));
        root.push(SceneNode::with_mesh(
            "cockpit",
            Transform::IDENTITY.with_scale(Vec3::splat(cockpit_scale)),
            parts.cockpit.clone(),
            cockpit_color,
        ));
        root.push(SceneNode::with_mesh(
            "lights",
            Transform::IDENTITY.with_scale(Vec3::splat(lights_scale)),
            parts.lights.clone(),
            lights_color,
        ));
        root.push(SceneNode::with_mesh(
            "antenna",
            Transform::from_translation(Vec3::Y * COCKPIT_RADIUS * cockpit_scale)
                .with_scale(Vec3::splat(antenna_scale)),
            parts.antenna.clone(),
            antenna_color,
        ));

        for i in 0..RIVET_COUNT {
            let angle = i as f32 / RIVET_COUNT as f32 * TAU;
            root.push(SceneNode::with_mesh(
                "rivet",
                Transform::from_translation(around(angle, crown.x, crown.y)),
                parts.rivet.clone(),
                GRAY,
            ));
        }

        if variant.landing_gear() {
            for i in 0..3 {
                let angle = i as f32 / 3.0 * TAU;
                root.push(SceneNode::with_mesh(
                    "leg",
                    Transform::from_translation(around(angle, rim * 0.5, -1.0)),
                    parts.leg.clone(),
                    GRAY,
                ));
            }
        }

        if variant.spikes() {
            let color = body_color.map(|c| c * 0.8);
            for i in 0..8 {
                let angle = i as f32 / 8.0 * TAU;
                // Lay the spike along +Z, then swing it outward
                let rotation = Quat::from_rotation_y(angle) * Quat::from_rotation_x(FRAC_PI_2);
                root.push(SceneNode::with_mesh(
                    "spike",
                    Transform::from_translation(around(angle, rim, 0.0)).with_rotation(rotation),
                    parts.spike.clone(),
                    color,
                ));
            }
        }

        if variant == UfoVariant::SpikesAndExhaust {
            for i in 0..2 {
                let angle = i as f32 * std::f32::consts::PI;
                root.push(SceneNode::with_mesh(
                    "exhaust",
                    Transform::from_translation(around(angle, rim * 0.5, -0.5))
                        .with_rotation(Quat::from_rotation_y(angle)),
                    parts.exhaust.clone(),
                    EXHAUST_COLOR,
                ));
            }
        }

        if variant.layers() {
            for i in 1..3 {
                let layer_scale = body_scale * (1.0 - i as f32 * 0.1);
                root.push(SceneNode::with_mesh(
                    "layer",
                    Transform::from_translation(Vec3::Y * 0.2 * i as f32).with_scale(Vec3::splat(layer_scale)),
                    parts.body.clone(),
                    random_vivid(&mut rng),
                ));
            }
        }

        if variant == UfoVariant::LayersAndRing {
            root.push(SceneNode::with_mesh(
                "ring",
                Transform::from_translation(Vec3::Y * crown.y * 0.5).with_scale(Vec3::splat(rim * 1.05)),
                parts.ring.clone(),
                random_vivid(&mut rng),
            ));
        }

        let mut pulse_colors = Vec::new();
        if variant == UfoVariant::GearSpikesAndPulse {
            for i in 0..4 {
                let angle = i as f32 / 4.0 * TAU;
                let color = random_color(&mut rng, 0.8, 1.0);
                pulse_colors.push(color);
                root.push(SceneNode::with_mesh(
                    "pulse_light",
                    Transform::from_translation(around(angle, rim * 0.5, crown.y)),
                    parts.pulse_light.clone(),
                    color,
                ));
            }
        }

        let mut hologram = None;
        if variant == UfoVariant::LayersSpikesAndHologram {
            root.push(SceneNode::with_mesh(
                "hologram",
                Transform::from_translation(Vec3::Y * (crown.y + COCKPIT_RADIUS))
                    .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                parts.display.clone(),
                HOLOGRAM_COLOR,
            ));
            hologram = Some(holographic_texture(self.config.texture_size, rng.next_seed() as u32)?);
        }

        log::debug!("UFO {index}: seed {}, {variant:?}, {} parts", seed.value, root.node_count() - 1);

        Ok(Ufo {
            index,
            seed,
            variant,
            body_scale,
            root,
            hologram,
            pulse_colors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::MeshCollector;

    fn config() -> UfoConfig {
        UfoConfig {
            seed: 99,
            texture_size: 8,
            ..UfoConfig::default()
        }
    }

    #[test]
    fn test_fleet_deterministic() {
        let mut a = UfoGenerator::new(config()).unwrap();
        let mut b = UfoGenerator::new(config()).unwrap();
        let first = a.regenerate().unwrap().to_vec();
        assert_eq!(first.as_slice(), b.regenerate().unwrap());

        assert_eq!(first.as_slice(), a.regenerate().unwrap());
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_ships_independent_of_fleet_size() {
        let mut small = UfoGenerator::new(UfoConfig { count: 2, ..config() }).unwrap();
        let mut large = UfoGenerator::new(UfoConfig { count: 6, ..config() }).unwrap();
        let small = small.regenerate().unwrap().to_vec();
        let large = large.regenerate().unwrap();
        assert_eq!(small.as_slice(), &large[..2]);
        assert_ne!(large[0].seed, large[1].seed);

        let mut other = UfoGenerator::new(UfoConfig { seed: 100, ..config() }).unwrap();
        assert_ne!(other.regenerate().unwrap()[0].seed, large[0].seed);
    }

    #[test]
    fn test_common_parts() {
        let mut generator = UfoGenerator::new(config()).unwrap();
        for ufo in generator.regenerate().unwrap() {
            assert_eq!(ufo.seed, WorldSeed::new(99).for_object(UFO_LAYER, ufo.index as u64));
            assert!((0.8..1.2).contains(&ufo.body_scale));
            assert_eq!(ufo.parts_named("rivet").count(), 16);

            for name in ["cockpit", "lights", "antenna"] {
                let scale = ufo.part(name).unwrap().transform.scale.x;
                assert!((0.5..1.0).contains(&scale), "{name} scale {scale}");
            }

            let body = ufo.part("body").unwrap();
            assert!(body.color.iter().all(|c| (0.2..0.4).contains(c)));
            let body_mesh = body.mesh.as_ref().unwrap();
            assert!(body_mesh.indices_valid());
            assert!((body_mesh.bounds().max.x - 3.0).abs() < 1e-4);

            let lights = ufo.part("lights").unwrap().mesh.as_ref().unwrap();
            assert_eq!(lights.vertex_count(), 8 * 12);
            assert!(ufo.part("lights").unwrap().color.iter().all(|c| (0.8..1.0).contains(c)));
        }
    }

    #[test]
    fn test_variants_by_index() {
        let mut generator = UfoGenerator::new(UfoConfig { count: 6, ..config() }).unwrap();
        let fleet = generator.regenerate().unwrap();

        assert_eq!(fleet[0].parts_named("leg").count(), 3);
        assert_eq!(fleet[0].parts_named("spike").count(), 0);

        assert_eq!(fleet[1].parts_named("spike").count(), 8);
        assert_eq!(fleet[1].parts_named("exhaust").count(), 2);

        assert_eq!(fleet[2].parts_named("layer").count(), 2);
        assert!(fleet[2].part("ring").is_some());

        assert_eq!(fleet[3].parts_named("leg").count(), 3);
        assert_eq!(fleet[3].parts_named("spike").count(), 8);
        assert_eq!(fleet[3].parts_named("pulse_light").count(), 4);

        assert_eq!(fleet[4].parts_named("layer").count(), 2);
        assert!(fleet[4].part("hologram").is_some());
        assert_eq!(fleet[4].hologram.as_ref().unwrap().width, 8);
        assert!(fleet[0].hologram.is_none());

        assert_eq!(fleet[5].variant, UfoVariant::LandingGear);
    }

    #[test]
    fn test_row_layout() {
        let mut generator = UfoGenerator::new(config()).unwrap();
        let fleet = generator.regenerate().unwrap();
        assert_eq!(fleet[0].root.transform.translation, Vec3::new(-15.0, 1.5, 0.0));
        assert_eq!(fleet[3].root.transform.translation, Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_animate() {
        let mut generator = UfoGenerator::new(config()).unwrap();
        generator.regenerate().unwrap();
        let before = generator.fleet()[3].parts_named("pulse_light").next().unwrap().color;

        generator.animate(1.5);

        let ring = generator.fleet()[2].part("ring").unwrap();
        let expected = Quat::from_rotation_y(45f32.to_radians());
        assert!(ring.transform.rotation.abs_diff_eq(expected, 1e-5));

        // Half way back down the ping-pong: intensity 0.75
        let after = generator.fleet()[3].parts_named("pulse_light").next().unwrap().color;
        for (a, b) in after.iter().zip(before) {
            assert!((a - b * 0.75).abs() < 1e-5);
        }
    }

    #[test]
    fn test_emit() {
        let mut generator = UfoGenerator::new(UfoConfig { count: 1, ..config() }).unwrap();
        generator.regenerate().unwrap();
        let mut collector = MeshCollector::new();
        generator.emit(&mut collector);
        // body, cockpit, lights, antenna, rivets, legs
        assert_eq!(collector.submissions, 4 + 16 + 3);
        assert!(collector.mesh.indices_valid());
    }

    #[test]
    fn test_invalid_config() {
        let bad = UfoConfig { min_scale: 2.0, max_scale: 1.0, ..UfoConfig::default() };
        assert!(matches!(UfoGenerator::new(bad), Err(ConfigError::InvalidDimension { .. })));

        let bad = UfoConfig { body_segments: 2, ..UfoConfig::default() };
        assert!(matches!(UfoGenerator::new(bad), Err(ConfigError::InvalidSegments { .. })));
    }
}
