//! Animation drivers: per-screen state that turns frame timestamps into uniforms.
//!
//! Each driver is ticked by the host once per rendered frame while
//! [`Effect::wants_frames`] is true, then asked to publish its uniforms for the
//! frame about to be rasterized.

mod gradient;
mod ripple;
mod star;

pub use gradient::GradientDriver;
pub use ripple::{RippleDriver, RIPPLE_MAX_SECS};
pub use star::{flight_center, StarDriver, STAR_FLIGHT_SECS};

use crate::clock::{elapsed_secs, secs_to_ns};
use crate::config::EffectKind;
use crate::uniforms::UniformSink;

pub trait Effect {
    fn kind(&self) -> EffectKind;

    /// Whether the host should keep sampling frames for this effect.
    fn wants_frames(&self) -> bool;

    fn tick(&mut self, now_ns: u64);

    fn publish(&self, resolution: [f32; 2], sink: &mut dyn UniformSink);

    fn is_active(&self) -> bool;

    /// Seconds into the current run (or since mount, for untriggered effects).
    fn elapsed(&self) -> f32;

    /// Pointer-down at a surface pixel coordinate.
    fn tap(&mut self, _point: [f32; 2]) {}

    /// Button/keyboard action. Returns true if the effect started a run.
    fn primary_action(&mut self, _resolution: [f32; 2]) -> bool {
        false
    }

    /// Text drawn centered over the surface.
    fn caption(&self) -> Option<&'static str> {
        None
    }

    /// Label of the screen's bottom button, if it has one.
    fn button_label(&self) -> Option<&'static str> {
        None
    }
}

pub fn make_effect(kind: EffectKind) -> Box<dyn Effect> {
    match kind {
        EffectKind::Gradient => Box::new(GradientDriver::new()),
        EffectKind::Ripple => Box::new(RippleDriver::new()),
        EffectKind::Star => Box::new(StarDriver::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Active,
}

/// When a timed run counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndRule {
    /// Finish on the first frame whose elapsed time is strictly past the duration.
    Exceeded,
    /// Finish on the first frame whose elapsed time reaches the duration.
    Reached,
}

/// Result of one [`TimedRun::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Anchored,
    Running,
    Finished,
}

/// Fixed-duration run shared by the triggered effects.
///
/// The first frame after `start` anchors the run's start timestamp and keeps
/// elapsed at 0; later frames measure from that anchor. The end check runs on
/// whole nanoseconds so an f32 elapsed never rounds a finished run back under
/// its duration.
#[derive(Debug, Clone)]
pub struct TimedRun {
    duration: f32,
    duration_ns: u64,
    end: EndRule,
    phase: RunPhase,
    anchor_ns: Option<u64>,
    elapsed: f32,
}

impl TimedRun {
    pub fn new(duration: f32, end: EndRule) -> Self {
        Self {
            duration,
            duration_ns: secs_to_ns(duration),
            end,
            phase: RunPhase::Idle,
            anchor_ns: None,
            elapsed: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.phase = RunPhase::Active;
        self.anchor_ns = None;
        self.elapsed = 0.0;
    }

    pub fn tick(&mut self, now_ns: u64) -> TickOutcome {
        if self.phase == RunPhase::Idle {
            return TickOutcome::Idle;
        }
        let Some(anchor) = self.anchor_ns else {
            self.anchor_ns = Some(now_ns);
            return TickOutcome::Anchored;
        };

        let run_ns = now_ns.saturating_sub(anchor);
        self.elapsed = elapsed_secs(anchor, now_ns).max(self.elapsed);
        let done = match self.end {
            EndRule::Exceeded => run_ns > self.duration_ns,
            EndRule::Reached => run_ns >= self.duration_ns,
        };
        if done {
            self.elapsed = self.elapsed.max(self.duration);
            self.phase = RunPhase::Idle;
            self.anchor_ns = None;
            TickOutcome::Finished
        } else {
            TickOutcome::Running
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Active
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Elapsed time as a fraction of the duration, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}
