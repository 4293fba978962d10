use std::fmt;

pub const U_RESOLUTION: &str = "u_resolution";
pub const U_TIME: &str = "u_time";
pub const U_TOUCH: &str = "u_touch";
pub const U_ACTIVE: &str = "u_active";
pub const U_CENTER: &str = "u_center";
pub const U_PHASE: &str = "u_phase";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2([f32; 2]),
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.4}"),
            Self::Float2([x, y]) => write!(f, "({x:.4}, {y:.4})"),
        }
    }
}

/// Upload side of a pixel program: named values applied before the next raster pass.
pub trait UniformSink {
    fn set_float(&mut self, name: &'static str, v: f32);
    fn set_float2(&mut self, name: &'static str, x: f32, y: f32);
}

/// Per-frame parameter set. Keeps insertion order so traces and the HUD list
/// uniforms the way the driver published them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    entries: Vec<(&'static str, UniformValue)>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Scalar lookup; a missing or vector uniform reads as 0, like an unset GPU uniform.
    pub fn float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(UniformValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    pub fn float2(&self, name: &str) -> [f32; 2] {
        match self.get(name) {
            Some(UniformValue::Float2(v)) => v,
            _ => [0.0, 0.0],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, UniformValue)> + '_ {
        self.entries.iter().copied()
    }

    fn put(&mut self, name: &'static str, value: UniformValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// One-line `name=value` summary for the HUD.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl UniformSink for UniformSet {
    fn set_float(&mut self, name: &'static str, v: f32) {
        self.put(name, UniformValue::Float(v));
    }

    fn set_float2(&mut self, name: &'static str, x: f32, y: f32) {
        self.put(name, UniformValue::Float2([x, y]));
    }
}
