use std::time::Instant;

pub const NANOS_PER_SEC: f32 = 1_000_000_000.0;

/// Source of per-frame timestamps.
///
/// Implementations must never go backwards; drivers compute elapsed time as a
/// plain difference of two samples.
pub trait FrameClock {
    fn now_ns(&mut self) -> u64;
}

/// Wall clock used by the interactive app. Timestamps are nanoseconds since
/// the clock was created.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now_ns(&mut self) -> u64 {
        self.origin.elapsed().as_nanos().min(u64::MAX as u128) as u64
    }
}

/// Deterministic clock that advances by a fixed step every time it is sampled.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: u64,
    step: u64,
}

impl ManualClock {
    pub fn new(start_ns: u64, step_ns: u64) -> Self {
        Self {
            now: start_ns,
            step: step_ns,
        }
    }

    pub fn at_fps(start_ns: u64, fps: u32) -> Self {
        Self::new(start_ns, frame_interval_ns(fps))
    }
}

impl FrameClock for ManualClock {
    fn now_ns(&mut self) -> u64 {
        let t = self.now;
        self.now = self.now.saturating_add(self.step);
        t
    }
}

pub fn frame_interval_ns(fps: u32) -> u64 {
    1_000_000_000u64 / u64::from(fps.max(1))
}

/// Whole nanoseconds in a non-negative duration given in seconds, snapped to
/// the microsecond so `3.95f32` maps to exactly 3_950_000_000.
pub fn secs_to_ns(secs: f32) -> u64 {
    (f64::from(secs.max(0.0)) * 1e6).round() as u64 * 1_000
}

/// Seconds between two frame timestamps, saturating at zero.
pub fn elapsed_secs(start_ns: u64, now_ns: u64) -> f32 {
    now_ns.saturating_sub(start_ns) as f32 / NANOS_PER_SEC
}
