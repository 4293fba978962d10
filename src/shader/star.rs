use crate::shader::math::{length2, mix3, normalize_coord, scale3, sd_star5, smoothstep, Vec2, Vec3};
use crate::shader::PixelProgram;
use crate::uniforms::{UniformSet, U_ACTIVE, U_CENTER, U_PHASE, U_RESOLUTION};

const BACKGROUND: Vec3 = [0.05, 0.07, 0.12];
const GOLD: Vec3 = [0.85, 0.65, 0.10];
const RED: Vec3 = [0.90, 0.10, 0.10];
const STAR_SCALE: f32 = 0.22;
const INNER_RATIO: f32 = 0.35;

pub struct StarProgram;

impl PixelProgram for StarProgram {
    fn uniforms(&self) -> &'static [&'static str] {
        &[U_RESOLUTION, U_CENTER, U_ACTIVE, U_PHASE]
    }

    fn eval(&self, frag: Vec2, u: &UniformSet) -> Vec3 {
        if u.float(U_ACTIVE) < 0.5 {
            return BACKGROUND;
        }

        let uv = normalize_coord(frag, u.float2(U_RESOLUTION));
        let center = u.float2(U_CENTER);
        let p = [
            (uv[0] - center[0]) / STAR_SCALE,
            (uv[1] - center[1]) / STAR_SCALE,
        ];

        let d = sd_star5(p, 1.0, INNER_RATIO);
        let mask = smoothstep(0.01, 0.0, d);

        let phase = u.float(U_PHASE).clamp(0.0, 1.0);
        let radial = 1.0 - length2(p).clamp(0.0, 1.0);
        let star = scale3(mix3(GOLD, RED, phase), 0.9 + 0.1 * radial);

        mix3(BACKGROUND, star, mask)
    }
}
