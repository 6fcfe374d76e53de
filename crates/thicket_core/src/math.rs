use glam::{Mat3, Quat, Vec3};

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation whose local +Z faces `forward` and whose local +Y leans toward `up`.
/// Returns `None` when `forward` is degenerate.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    // Parallel up vector: pick any axis not aligned with forward
    let up = if up.cross(forward).length_squared() < 1e-8 {
        if forward.y.abs() < 0.9 { Vec3::Y } else { Vec3::X }
    } else {
        up
    };
    let right = up.cross(forward).normalize();
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)))
}

/// HSV (all components in `[0, 1]`) to linear RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Cubic Bezier point for four control points
pub fn bezier_point(t: f32, p: &[Vec3; 4]) -> Vec3 {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;

    p[0] * (uu * u) + p[1] * (3.0 * uu * t) + p[2] * (3.0 * u * tt) + p[3] * (tt * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_rotation_faces_forward() {
        let dir = Vec3::new(1.0, 2.0, -0.5).normalize();
        let rot = look_rotation(dir, Vec3::Y).unwrap();
        assert!((rot * Vec3::Z - dir).length() < 1e-5);

        // Straight up still works
        let rot = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert!((rot * Vec3::Z - Vec3::Y).length() < 1e-5);

        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_hsv() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        let grey = hsv_to_rgb(0.2, 0.0, 0.5);
        assert!(grey.iter().all(|c| (c - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_bezier_endpoints() {
        let p = [
            Vec3::ZERO,
            Vec3::new(1.0, 0.5, 0.0),
            Vec3::new(2.0, 0.5, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ];
        assert!((bezier_point(0.0, &p) - p[0]).length() < 1e-6);
        assert!((bezier_point(1.0, &p) - p[3]).length() < 1e-6);
        assert!((bezier_point(0.5, &p).y - 0.375).abs() < 1e-6);
    }
}
