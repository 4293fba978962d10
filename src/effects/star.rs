use crate::config::EffectKind;
use crate::effects::{Effect, EndRule, TickOutcome, TimedRun};
use crate::uniforms::{UniformSink, U_ACTIVE, U_CENTER, U_PHASE, U_RESOLUTION};

pub const STAR_FLIGHT_SECS: f32 = 3.95;

/// Normalized star center for a flight progress in [0, 1].
///
/// Horizontal sweep from 0.05 to 0.95. The vertical is y-down: the star starts
/// and lands at 0.8 and crests at 0.35 mid-flight.
pub fn flight_center(progress: f32) -> [f32; 2] {
    let t = progress.clamp(0.0, 1.0);
    let u = 2.0 * t - 1.0;
    let x = 0.5 + 0.45 * u;
    let y = 0.8 - 0.45 * (1.0 - u * u);
    [x, y]
}

#[derive(Debug, Clone)]
pub struct StarDriver {
    run: TimedRun,
    progress: f32,
}

impl StarDriver {
    pub fn new() -> Self {
        Self {
            run: TimedRun::new(STAR_FLIGHT_SECS, EndRule::Reached),
            progress: 0.0,
        }
    }

    /// Start a flight. No-op while one is in progress; returns whether it started.
    pub fn launch(&mut self) -> bool {
        if self.run.is_active() {
            return false;
        }
        self.progress = 0.0;
        self.run.start();
        log::debug!("star launched");
        true
    }

    pub fn is_flying(&self) -> bool {
        self.run.is_active()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }
}

impl Default for StarDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for StarDriver {
    fn kind(&self) -> EffectKind {
        EffectKind::Star
    }

    fn wants_frames(&self) -> bool {
        self.run.is_active()
    }

    fn tick(&mut self, now_ns: u64) {
        match self.run.tick(now_ns) {
            TickOutcome::Running => self.progress = self.run.progress(),
            TickOutcome::Finished => {
                self.progress = self.run.progress();
                log::debug!("star landed after {:.3}s", self.run.elapsed());
            }
            TickOutcome::Idle | TickOutcome::Anchored => {}
        }
    }

    fn publish(&self, resolution: [f32; 2], sink: &mut dyn UniformSink) {
        let phase = self.progress.clamp(0.0, 1.0);
        let [cx, cy] = flight_center(phase);
        sink.set_float2(U_RESOLUTION, resolution[0], resolution[1]);
        sink.set_float2(U_CENTER, cx, cy);
        sink.set_float(U_ACTIVE, if self.run.is_active() { 1.0 } else { 0.0 });
        sink.set_float(U_PHASE, phase);
    }

    fn is_active(&self) -> bool {
        self.run.is_active()
    }

    fn elapsed(&self) -> f32 {
        self.run.elapsed()
    }

    fn primary_action(&mut self, _resolution: [f32; 2]) -> bool {
        self.launch()
    }

    fn button_label(&self) -> Option<&'static str> {
        Some(if self.is_flying() {
            "Star in flight..."
        } else {
            "Launch star"
        })
    }
}
