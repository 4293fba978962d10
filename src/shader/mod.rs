//! CPU pixel programs, one per effect.
//!
//! Each program is a pure function of the fragment coordinate (pixel center,
//! in surface pixels) and the frame's uniform set. The Metal kernels in
//! `shaders/effects.metal` implement the same formulas under the same uniform
//! names.

pub mod math;

mod gradient;
mod ripple;
mod star;

pub use gradient::GradientProgram;
pub use ripple::{ripple_time_mask, RippleProgram};
pub use star::StarProgram;

use crate::config::EffectKind;
use crate::uniforms::UniformSet;
use math::{Vec2, Vec3};

pub trait PixelProgram: Send + Sync {
    /// Uniform names the program reads.
    fn uniforms(&self) -> &'static [&'static str];

    fn eval(&self, frag: Vec2, u: &UniformSet) -> Vec3;
}

pub fn program_for(kind: EffectKind) -> &'static dyn PixelProgram {
    match kind {
        EffectKind::Gradient => &GradientProgram,
        EffectKind::Ripple => &RippleProgram,
        EffectKind::Star => &StarProgram,
    }
}
