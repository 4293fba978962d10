//! Surface rasterizers: fill the whole `w x h` surface with an effect's pixel
//! program, given the frame's uniforms.

#[cfg(target_os = "macos")]
mod metal;

#[cfg(target_os = "macos")]
pub use metal::MetalEngine;

use crate::config::EffectKind;
use crate::shader::math::to_rgba8;
use crate::shader::program_for;
use crate::uniforms::UniformSet;

pub trait VisualEngine {
    fn name(&self) -> &'static str;

    fn resize(&mut self, w: usize, h: usize);

    fn size(&self) -> (usize, usize);

    /// Rasterize one frame as tightly packed RGBA8. `scale` > 1 evaluates the
    /// program on a coarser grid and upsamples with nearest neighbour.
    fn render(&mut self, kind: EffectKind, uniforms: &UniformSet, scale: usize) -> &[u8];
}

/// Grid the program is evaluated on for a given output size and downscale.
pub fn internal_size(w: usize, h: usize, scale: usize) -> (usize, usize) {
    let scale = scale.max(1);
    (w.div_ceil(scale), h.div_ceil(scale))
}

/// Nearest-neighbour upsample of a tightly packed RGBA8 buffer.
pub(crate) fn upsample_nearest(
    src: &[u8],
    sw: usize,
    sh: usize,
    dst: &mut [u8],
    dw: usize,
    dh: usize,
) {
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }
    let src_row_bytes = sw * 4;
    let dst_row_bytes = dw * 4;
    if src.len() < src_row_bytes * sh || dst.len() < dst_row_bytes * dh {
        return;
    }
    for y in 0..dh {
        let sy = (y * sh / dh).min(sh - 1);
        let src_row = &src[sy * src_row_bytes..(sy + 1) * src_row_bytes];
        let dst_row = &mut dst[y * dst_row_bytes..(y + 1) * dst_row_bytes];
        for x in 0..dw {
            let sx = (x * sw / dw).min(sw - 1);
            dst_row[x * 4..x * 4 + 4].copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }
}

/// Evaluates pixel programs on the CPU, one pixel center at a time.
pub struct CpuEngine {
    w: usize,
    h: usize,
    pixels: Vec<u8>,
    coarse: Vec<u8>,
}

impl CpuEngine {
    pub fn new() -> Self {
        Self {
            w: 0,
            h: 0,
            pixels: Vec::new(),
            coarse: Vec::new(),
        }
    }

    fn evaluate(kind: EffectKind, uniforms: &UniformSet, w: usize, h: usize, iw: usize, ih: usize, out: &mut [u8]) {
        let program = program_for(kind);
        let sx = w as f32 / iw as f32;
        let sy = h as f32 / ih as f32;
        for y in 0..ih {
            let fy = (y as f32 + 0.5) * sy;
            for x in 0..iw {
                let fx = (x as f32 + 0.5) * sx;
                let c = program.eval([fx, fy], uniforms);
                let i = (y * iw + x) * 4;
                out[i..i + 4].copy_from_slice(&to_rgba8(c));
            }
        }
    }
}

impl Default for CpuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualEngine for CpuEngine {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.pixels.resize(w.saturating_mul(h).saturating_mul(4), 0);
        self.pixels.fill(0);
    }

    fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    fn render(&mut self, kind: EffectKind, uniforms: &UniformSet, scale: usize) -> &[u8] {
        let (w, h) = (self.w, self.h);
        if w == 0 || h == 0 {
            return &self.pixels;
        }

        let (iw, ih) = internal_size(w, h, scale);
        if iw == w && ih == h {
            Self::evaluate(kind, uniforms, w, h, w, h, &mut self.pixels);
            return &self.pixels;
        }

        self.coarse.resize(iw * ih * 4, 0);
        Self::evaluate(kind, uniforms, w, h, iw, ih, &mut self.coarse);
        upsample_nearest(&self.coarse, iw, ih, &mut self.pixels, w, h);
        &self.pixels
    }
}
