use noise::{NoiseFn, Perlin};
use thicket_core::ConfigError;

/// RGBA float texture, row-major from the bottom row up
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

/// Perlin sample remapped into [0, 1]
fn sample(noise: &Perlin, x: f32, y: f32) -> f32 {
    (noise.get([x as f64, y as f64]) as f32 * 0.5 + 0.5).clamp(0.0, 1.0)
}

fn generate(
    width: u32,
    height: u32,
    scale: f32,
    seed: u32,
    color: impl Fn(f32) -> [f32; 4],
) -> Result<Texture, ConfigError> {
    for (what, got) in [("texture width", width), ("texture height", height)] {
        if got == 0 {
            return Err(ConfigError::InvalidCount { what, min: 1, got: 0 });
        }
    }

    let noise = Perlin::new(seed);
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let u = x as f32 / width as f32 * scale;
            let v = y as f32 / height as f32 * scale;
            pixels.push(color(sample(&noise, u, v)));
        }
    }

    Ok(Texture { width, height, pixels })
}

/// Ground tint: only the red channel varies
pub fn ground_texture(width: u32, height: u32, scale: f32, seed: u32) -> Result<Texture, ConfigError> {
    generate(width, height, scale, seed, |n| [n, 0.0, 0.0, 1.0])
}

/// Greyscale bark/leaf mottling for bush branches
pub fn bush_texture(size: u32, seed: u32) -> Result<Texture, ConfigError> {
    generate(size, size, 10.0, seed, |n| [n, n, n, 1.0])
}

/// Green with noise in alpha, for UFO display panels
pub fn holographic_texture(size: u32, seed: u32) -> Result<Texture, ConfigError> {
    generate(size, size, 5.0, seed, |n| [0.0, 1.0, 0.0, n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_texture_red_only() {
        let tex = ground_texture(64, 32, 20.0, 7).unwrap();
        assert_eq!(tex.pixels.len(), 64 * 32);
        assert!(tex.pixels.iter().all(|p| p[1] == 0.0 && p[2] == 0.0 && p[3] == 1.0));
        assert!(tex.pixels.iter().all(|p| (0.0..=1.0).contains(&p[0])));

        // Not a flat fill
        let first = tex.pixels[5 * 64 + 3][0];
        assert!(tex.pixels.iter().any(|p| (p[0] - first).abs() > 1e-3));
    }

    #[test]
    fn test_seeded() {
        assert_eq!(bush_texture(16, 3).unwrap(), bush_texture(16, 3).unwrap());
        let holo = holographic_texture(8, 1).unwrap();
        assert!(holo.pixels.iter().all(|p| p[1] == 1.0));
    }

    #[test]
    fn test_empty_texture_rejected() {
        assert!(ground_texture(0, 10, 1.0, 0).is_err());
    }
}
