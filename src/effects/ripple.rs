use crate::config::EffectKind;
use crate::effects::{Effect, EndRule, TickOutcome, TimedRun};
use crate::uniforms::{UniformSink, U_ACTIVE, U_RESOLUTION, U_TIME, U_TOUCH};

/// Hard cutoff for a ripple run. The program's own fade ends earlier; frames in
/// between publish `u_active = 1` with zero visible intensity.
pub const RIPPLE_MAX_SECS: f32 = 1.5;

#[derive(Debug, Clone)]
pub struct RippleDriver {
    touch: [f32; 2],
    run: TimedRun,
    has_touch: bool,
}

impl RippleDriver {
    pub fn new() -> Self {
        Self {
            touch: [0.0, 0.0],
            run: TimedRun::new(RIPPLE_MAX_SECS, EndRule::Exceeded),
            has_touch: false,
        }
    }

    /// Start a ripple at `point` (surface pixels). Restarts a run in progress.
    pub fn trigger(&mut self, point: [f32; 2]) {
        self.touch = point;
        self.has_touch = true;
        self.run.start();
        log::debug!("ripple triggered at ({:.1}, {:.1})", point[0], point[1]);
    }

    pub fn touch(&self) -> [f32; 2] {
        self.touch
    }
}

impl Default for RippleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for RippleDriver {
    fn kind(&self) -> EffectKind {
        EffectKind::Ripple
    }

    fn wants_frames(&self) -> bool {
        self.run.is_active()
    }

    fn tick(&mut self, now_ns: u64) {
        if self.run.tick(now_ns) == TickOutcome::Finished {
            log::debug!("ripple finished after {:.3}s", self.run.elapsed());
        }
    }

    fn publish(&self, resolution: [f32; 2], sink: &mut dyn UniformSink) {
        sink.set_float2(U_RESOLUTION, resolution[0], resolution[1]);
        sink.set_float2(U_TOUCH, self.touch[0], self.touch[1]);
        sink.set_float(U_TIME, self.run.elapsed());
        sink.set_float(U_ACTIVE, if self.run.is_active() { 1.0 } else { 0.0 });
    }

    fn is_active(&self) -> bool {
        self.run.is_active()
    }

    fn elapsed(&self) -> f32 {
        self.run.elapsed()
    }

    fn tap(&mut self, point: [f32; 2]) {
        self.trigger(point);
    }

    fn primary_action(&mut self, resolution: [f32; 2]) -> bool {
        let point = if self.has_touch {
            self.touch
        } else {
            [resolution[0] * 0.5, resolution[1] * 0.5]
        };
        self.trigger(point);
        true
    }

    fn caption(&self) -> Option<&'static str> {
        Some("Tap the screen")
    }
}
