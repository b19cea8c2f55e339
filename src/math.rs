use glam::{Vec2, Vec3};

/// Edge function used in rasterization
pub fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

/// Calculates the light intensity for a directional light travelling along `light_dir`
pub fn calculate_light_intensity(normal: Vec3, light_dir: Vec3) -> f32 {
    let to_light = -light_dir.normalize_or_zero();
    let diffuse = normal.dot(to_light).max(0.0);
    // Ambient floor so unlit sides stay readable
    0.35 + 0.65 * diffuse
}

/// Linear interpolation, `a` at `t = 0` and `b` at `t = 1`
pub fn mix<T>(a: T, b: T, t: f32) -> T
where
    T: std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::ops::Mul<f32, Output = T>
        + Copy,
{
    a + (b - a) * t
}

/// Blend factor for frame-rate independent exponential smoothing.
///
/// After `dt` seconds a fraction `k` of the original gap remains per second,
/// so `mix(x, target, smoothing_factor(k, dt))` converges the same way at any
/// frame rate.
pub fn smoothing_factor(k: f32, dt: f32) -> f32 {
    1.0 - k.powf(dt)
}

/// Intersects a ray with a sphere.
///
/// Returns the smallest non-negative ray parameter at which the ray touches the
/// sphere, or `None` if it misses or the sphere lies entirely behind the origin.
/// The parameter is measured in units of `dir`, so it is a distance only when
/// `dir` is normalized. A ray that starts inside the sphere always hits.
pub fn ray_sphere_hit(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;

    let a = dir.dot(dir);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 >= 0.0 {
        Some(t1)
    } else if t2 >= 0.0 {
        // Origin is inside the sphere
        Some(0.0)
    } else {
        None
    }
}

/// Cosine between the camera's horizontal heading and the horizontal direction
/// from the camera to `target`. Degenerate directions yield `0.0`.
pub fn facing_dot(cam_pos: Vec3, cam_front: Vec3, target: Vec3) -> f32 {
    let heading = Vec3::new(cam_front.x, 0.0, cam_front.z).normalize_or_zero();
    let to_target = Vec3::new(target.x - cam_pos.x, 0.0, target.z - cam_pos.z).normalize_or_zero();
    heading.dot(to_target)
}
