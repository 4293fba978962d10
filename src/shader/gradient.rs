use crate::shader::math::{normalize_coord, Vec2, Vec3};
use crate::shader::PixelProgram;
use crate::uniforms::{UniformSet, U_RESOLUTION, U_TIME};

pub struct GradientProgram;

impl PixelProgram for GradientProgram {
    fn uniforms(&self) -> &'static [&'static str] {
        &[U_RESOLUTION, U_TIME]
    }

    fn eval(&self, frag: Vec2, u: &UniformSet) -> Vec3 {
        let uv = normalize_coord(frag, u.float2(U_RESOLUTION));
        let t = u.float(U_TIME);

        let r = 0.5 + 0.5 * (3.0 * uv[0] + t * 0.7).sin();
        let g = 0.5 + 0.5 * (3.0 * uv[1] + t * 1.1).sin();
        let b = 0.5 + 0.5 * (3.0 * (uv[0] + uv[1]) + t * 0.9).sin();
        [r, g, b]
    }
}
