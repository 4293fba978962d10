use crate::shader::math::{add3, distance2, normalize_coord, scale3, smoothstep, Vec2, Vec3};
use crate::shader::PixelProgram;
use crate::uniforms::{UniformSet, U_ACTIVE, U_RESOLUTION, U_TIME, U_TOUCH};

const SPEED: f32 = 2.0;
const FREQUENCY: f32 = 20.0;
const MAX_RADIUS: f32 = 0.5;

const BASE_COLOR: Vec3 = [0.1, 0.12, 0.18];
const RIPPLE_TINT: Vec3 = [0.2, 0.6, 1.0];

/// Fade applied over a run, as a function of seconds since the tap.
pub fn ripple_time_mask(time: f32) -> f32 {
    let t = time * SPEED;
    smoothstep(0.0, 1.0, 1.0 - t)
}

pub struct RippleProgram;

impl PixelProgram for RippleProgram {
    fn uniforms(&self) -> &'static [&'static str] {
        &[U_RESOLUTION, U_TOUCH, U_TIME, U_ACTIVE]
    }

    fn eval(&self, frag: Vec2, u: &UniformSet) -> Vec3 {
        let res = u.float2(U_RESOLUTION);
        let uv = normalize_coord(frag, res);
        let center = normalize_coord(u.float2(U_TOUCH), res);
        let dist = distance2(uv, center);

        let time = u.float(U_TIME);
        let t = time * SPEED;

        let wave = 0.5 + 0.5 * (FREQUENCY * (dist - t)).cos();
        let radius_mask = smoothstep(MAX_RADIUS, 0.0, dist);
        let time_mask = ripple_time_mask(time);

        let intensity = wave * radius_mask * time_mask * u.float(U_ACTIVE);
        add3(BASE_COLOR, scale3(RIPPLE_TINT, intensity))
    }
}
