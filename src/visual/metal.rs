use crate::config::EffectKind;
use crate::uniforms::{UniformSet, U_ACTIVE, U_CENTER, U_PHASE, U_RESOLUTION, U_TIME, U_TOUCH};
use crate::visual::{internal_size, upsample_nearest, VisualEngine};
use anyhow::{anyhow, Context};
use metal::*;
use objc::rc::autoreleasepool;

const METAL_SRC: &str = include_str!("../../shaders/effects.metal");

#[repr(C)]
#[derive(Clone, Copy, Default)]
struct GpuUniforms {
    u_resolution: [f32; 2],
    u_touch: [f32; 2],
    u_center: [f32; 2],
    frag_scale: [f32; 2],
    u_time: f32,
    u_active: f32,
    u_phase: f32,
    w: u32,
    h: u32,
    _pad0: u32,
}

impl GpuUniforms {
    /// Pack the named uniforms into the kernel's struct. Uniforms an effect does
    /// not publish stay zero.
    fn pack(set: &UniformSet, w: usize, h: usize, frag_scale: [f32; 2]) -> Self {
        Self {
            u_resolution: set.float2(U_RESOLUTION),
            u_touch: set.float2(U_TOUCH),
            u_center: set.float2(U_CENTER),
            frag_scale,
            u_time: set.float(U_TIME),
            u_active: set.float(U_ACTIVE),
            u_phase: set.float(U_PHASE),
            w: w as u32,
            h: h as u32,
            _pad0: 0,
        }
    }
}

fn kernel_name(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::Gradient => "gradient_fx",
        EffectKind::Ripple => "ripple_fx",
        EffectKind::Star => "star_fx",
    }
}

pub struct MetalEngine {
    device: Device,
    queue: CommandQueue,
    pipelines: Vec<(EffectKind, ComputePipelineState)>,
    uniforms: Buffer,

    out_w: usize,
    out_h: usize,
    w: usize,
    h: usize,
    tex: Texture,
    readback: Buffer,
    readback_bpr: usize,
    cpu_pixels: Vec<u8>,
    out_pixels: Vec<u8>,
}

impl MetalEngine {
    pub fn new() -> anyhow::Result<Self> {
        let device = Device::system_default().ok_or_else(|| anyhow!("no Metal device found"))?;
        let queue = device.new_command_queue();

        let options = CompileOptions::new();
        options.set_fast_math_enabled(true);
        let library = device
            .new_library_with_source(METAL_SRC, &options)
            .map_err(|e| anyhow!("Metal shader compile failed: {e}"))?;

        let mut pipelines = Vec::new();
        for kind in EffectKind::all() {
            let name = kernel_name(kind);
            let func = library
                .get_function(name, None)
                .map_err(|e| anyhow!("Metal get_function({name}) failed: {e}"))?;
            let pipeline = device
                .new_compute_pipeline_state_with_function(&func)
                .map_err(|e| anyhow!("Metal pipeline for {name} failed: {e}"))?;
            pipelines.push((kind, pipeline));
        }

        let uniforms = device.new_buffer(
            std::mem::size_of::<GpuUniforms>() as u64,
            MTLResourceOptions::StorageModeShared,
        );

        let (tex, readback, readback_bpr, cpu_pixels) = make_resources(&device, 1, 1)?;
        log::info!("metal engine ready on {}", device.name());

        Ok(Self {
            device,
            queue,
            pipelines,
            uniforms,
            out_w: 0,
            out_h: 0,
            w: 1,
            h: 1,
            tex,
            readback,
            readback_bpr,
            cpu_pixels,
            out_pixels: Vec::new(),
        })
    }

    fn ensure_size(&mut self, w: usize, h: usize) -> anyhow::Result<()> {
        let w = w.max(1);
        let h = h.max(1);
        if w == self.w && h == self.h {
            return Ok(());
        }
        let (tex, readback, readback_bpr, cpu_pixels) = make_resources(&self.device, w, h)
            .with_context(|| format!("allocate Metal render target ({w}x{h})"))?;
        self.tex = tex;
        self.readback = readback;
        self.readback_bpr = readback_bpr;
        self.cpu_pixels = cpu_pixels;
        self.w = w;
        self.h = h;
        Ok(())
    }

    fn pipeline(&self, kind: EffectKind) -> Option<&ComputePipelineState> {
        self.pipelines
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p)
    }
}

impl VisualEngine for MetalEngine {
    fn name(&self) -> &'static str {
        "metal"
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.out_w = w;
        self.out_h = h;
        self.out_pixels.resize(w.saturating_mul(h).saturating_mul(4), 0);
    }

    fn size(&self) -> (usize, usize) {
        (self.out_w, self.out_h)
    }

    fn render(&mut self, kind: EffectKind, uniforms: &UniformSet, scale: usize) -> &[u8] {
        let (out_w, out_h) = (self.out_w, self.out_h);
        if out_w == 0 || out_h == 0 {
            return &self.out_pixels;
        }
        let (iw, ih) = internal_size(out_w, out_h, scale);
        if let Err(err) = self.ensure_size(iw, ih) {
            log::error!("{err:#}");
            return &self.out_pixels;
        }
        let Some(pipeline) = self.pipeline(kind) else {
            return &self.out_pixels;
        };

        let frag_scale = [out_w as f32 / iw as f32, out_h as f32 / ih as f32];
        let u = GpuUniforms::pack(uniforms, self.w, self.h, frag_scale);
        unsafe {
            std::ptr::copy_nonoverlapping(
                (&u as *const GpuUniforms).cast::<u8>(),
                self.uniforms.contents().cast::<u8>(),
                std::mem::size_of::<GpuUniforms>(),
            );
        }

        let cmd = autoreleasepool(|| {
            let cmd = self.queue.new_command_buffer();

            let encoder = cmd.new_compute_command_encoder();
            encoder.set_compute_pipeline_state(pipeline);
            encoder.set_texture(0, Some(&self.tex));
            encoder.set_buffer(0, Some(&self.uniforms), 0);
            let tpg = MTLSize::new(self.w as u64, self.h as u64, 1);
            let tptg = MTLSize::new(16, 16, 1);
            encoder.dispatch_threads(tpg, tptg);
            encoder.end_encoding();

            let blit = cmd.new_blit_command_encoder();
            blit.copy_from_texture_to_buffer(
                &self.tex,
                0,
                0,
                MTLOrigin { x: 0, y: 0, z: 0 },
                MTLSize::new(self.w as u64, self.h as u64, 1),
                &self.readback,
                0,
                self.readback_bpr as u64,
                (self.readback_bpr.saturating_mul(self.h)) as u64,
                MTLBlitOption::None,
            );
            blit.end_encoding();

            let owned = cmd.to_owned();
            owned.commit();
            owned
        });
        cmd.wait_until_completed();

        let row_bytes = self.w * 4;
        unsafe {
            let src = std::slice::from_raw_parts(
                self.readback.contents().cast::<u8>(),
                self.readback_bpr.saturating_mul(self.h),
            );
            for y in 0..self.h {
                let src_off = y * self.readback_bpr;
                let dst_off = y * row_bytes;
                self.cpu_pixels[dst_off..dst_off + row_bytes]
                    .copy_from_slice(&src[src_off..src_off + row_bytes]);
            }
        }

        if self.w == out_w && self.h == out_h {
            self.out_pixels.copy_from_slice(&self.cpu_pixels);
        } else {
            upsample_nearest(&self.cpu_pixels, self.w, self.h, &mut self.out_pixels, out_w, out_h);
        }
        &self.out_pixels
    }
}

fn make_resources(device: &Device, w: usize, h: usize) -> anyhow::Result<(Texture, Buffer, usize, Vec<u8>)> {
    let w = w.max(1);
    let h = h.max(1);

    let desc = TextureDescriptor::new();
    desc.set_texture_type(MTLTextureType::D2);
    desc.set_pixel_format(MTLPixelFormat::RGBA8Unorm);
    desc.set_width(w as u64);
    desc.set_height(h as u64);
    desc.set_storage_mode(MTLStorageMode::Private);
    desc.set_usage(MTLTextureUsage::ShaderRead | MTLTextureUsage::ShaderWrite);
    let tex = device.new_texture(&desc);

    let align = (device.minimum_linear_texture_alignment_for_pixel_format(MTLPixelFormat::RGBA8Unorm) as usize).max(16);
    let row_bytes = w.saturating_mul(4);
    let readback_bpr = row_bytes.div_ceil(align) * align;
    let readback_len = readback_bpr.saturating_mul(h);
    if readback_len == 0 {
        return Err(anyhow!("empty readback buffer"));
    }
    let readback = device.new_buffer(readback_len as u64, MTLResourceOptions::StorageModeShared);

    let cpu_pixels = vec![0u8; row_bytes.saturating_mul(h)];
    Ok((tex, readback, readback_bpr, cpu_pixels))
}
