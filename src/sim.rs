//! Headless driving of an effect with a deterministic clock. Used by the
//! `fx_trace` tool and the end-to-end tests.

use crate::clock::{FrameClock, ManualClock};
use crate::config::EffectKind;
use crate::effects::make_effect;
use crate::uniforms::{UniformSet, UniformValue};
use crate::visual::{CpuEngine, VisualEngine};
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Pointer-down at a surface pixel.
    Tap([f32; 2]),
    /// The screen's primary action (star launch button).
    Launch,
}

/// Triggers keyed by the frame index they fire on, applied before that frame's tick.
#[derive(Debug, Clone, Default)]
pub struct TriggerScript {
    events: Vec<(u32, Trigger)>,
}

impl TriggerScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tap_at(mut self, frame: u32, point: [f32; 2]) -> Self {
        self.events.push((frame, Trigger::Tap(point)));
        self
    }

    pub fn launch_at(mut self, frame: u32) -> Self {
        self.events.push((frame, Trigger::Launch));
        self
    }

    pub fn at(&self, frame: u32) -> impl Iterator<Item = Trigger> + '_ {
        self.events
            .iter()
            .filter(move |(f, _)| *f == frame)
            .map(|(_, t)| *t)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointParseError {
    #[error("expected X,Y, got {0:?}")]
    Shape(String),
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
    #[error("coordinate {0} is not finite")]
    NotFinite(f32),
}

/// Surface pixel given on the command line as `X,Y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f32; 2]);

impl FromStr for Point {
    type Err = PointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((x, y)) = s.split_once(',') else {
            return Err(PointParseError::Shape(s.to_string()));
        };
        let parse = |v: &str| -> Result<f32, PointParseError> {
            let v = v.trim();
            let n = v
                .parse::<f32>()
                .map_err(|_| PointParseError::Coordinate(v.to_string()))?;
            if n.is_finite() {
                Ok(n)
            } else {
                Err(PointParseError::NotFinite(n))
            }
        };
        Ok(Point([parse(x)?, parse(y)?]))
    }
}

#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub index: u32,
    pub t_ns: u64,
    pub active: bool,
    pub uniforms: UniformSet,
}

/// Runs `frames` frames of `kind` at `fps`, starting at t = 0.
///
/// Mirrors the interactive host: triggers for a frame are delivered first, the
/// driver is ticked only while it wants frames, then uniforms are published.
pub fn simulate(
    kind: EffectKind,
    script: &TriggerScript,
    frames: u32,
    fps: u32,
    resolution: [f32; 2],
) -> Vec<FrameRecord> {
    let mut effect = make_effect(kind);
    let mut clock = ManualClock::at_fps(0, fps);
    let mut records = Vec::with_capacity(frames as usize);

    for index in 0..frames {
        let t_ns = clock.now_ns();
        for trigger in script.at(index) {
            match trigger {
                Trigger::Tap(point) => effect.tap(point),
                Trigger::Launch => {
                    effect.primary_action(resolution);
                }
            }
        }
        if effect.wants_frames() {
            effect.tick(t_ns);
        }
        let mut uniforms = UniformSet::new();
        effect.publish(resolution, &mut uniforms);
        records.push(FrameRecord {
            index,
            t_ns,
            active: effect.is_active(),
            uniforms,
        });
    }
    records
}

/// Rasterizes one frame's uniforms on the CPU at full resolution.
pub fn rasterize(kind: EffectKind, uniforms: &UniformSet, w: usize, h: usize) -> Vec<u8> {
    let mut engine = CpuEngine::new();
    engine.resize(w, h);
    engine.render(kind, uniforms, 1).to_vec()
}

/// Binary PPM (P6); alpha is dropped.
pub fn write_ppm(out: &mut dyn Write, rgba: &[u8], w: usize, h: usize) -> std::io::Result<()> {
    write!(out, "P6\n{w} {h}\n255\n")?;
    for px in rgba.chunks_exact(4).take(w * h) {
        out.write_all(&px[..3])?;
    }
    Ok(())
}

/// Tab-separated header matching [`tsv_row`] for records of this shape.
pub fn tsv_header(record: &FrameRecord) -> String {
    let mut cols = vec!["frame".to_string(), "t_ms".to_string(), "active".to_string()];
    for (name, value) in record.uniforms.iter() {
        match value {
            UniformValue::Float(_) => cols.push(name.to_string()),
            UniformValue::Float2(_) => {
                cols.push(format!("{name}.x"));
                cols.push(format!("{name}.y"));
            }
        }
    }
    cols.join("\t")
}

pub fn tsv_row(record: &FrameRecord) -> String {
    let mut cols = vec![
        record.index.to_string(),
        format!("{:.3}", record.t_ns as f64 / 1.0e6),
        (record.active as u8).to_string(),
    ];
    for (_, value) in record.uniforms.iter() {
        match value {
            UniformValue::Float(v) => cols.push(format!("{v:.5}")),
            UniformValue::Float2([x, y]) => {
                cols.push(format!("{x:.5}"));
                cols.push(format!("{y:.5}"));
            }
        }
    }
    cols.join("\t")
}
