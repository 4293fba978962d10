use crate::clock::NANOS_PER_SEC;
use crate::config::EffectKind;
use crate::effects::Effect;
use crate::uniforms::{UniformSink, U_RESOLUTION, U_TIME};

/// Free-running clock for the animated gradient. Never stops.
#[derive(Debug, Clone, Default)]
pub struct GradientDriver {
    time_secs: f32,
}

impl GradientDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_secs(&self) -> f32 {
        self.time_secs
    }
}

impl Effect for GradientDriver {
    fn kind(&self) -> EffectKind {
        EffectKind::Gradient
    }

    fn wants_frames(&self) -> bool {
        true
    }

    fn tick(&mut self, now_ns: u64) {
        self.time_secs = now_ns as f32 / NANOS_PER_SEC;
    }

    fn publish(&self, resolution: [f32; 2], sink: &mut dyn UniformSink) {
        sink.set_float2(U_RESOLUTION, resolution[0], resolution[1]);
        sink.set_float(U_TIME, self.time_secs);
    }

    fn is_active(&self) -> bool {
        true
    }

    fn elapsed(&self) -> f32 {
        self.time_secs
    }

    fn caption(&self) -> Option<&'static str> {
        Some("Hello, shaders!")
    }
}
