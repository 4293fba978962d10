use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "backdrop-fx",
    version,
    about = "Animated pixel-shader backdrops (gradient, tap ripple, flying star) in the terminal"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = EffectKind::Gradient)]
    pub effect: EffectKind,

    #[arg(long, value_enum, default_value_t = EngineMode::Cpu)]
    pub engine: EngineMode,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub adaptive_scale: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_probe: bool,

    #[arg(long, default_value_t = false)]
    pub autoplay: bool,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectKind {
    #[value(alias = "grad")]
    Gradient,
    #[value(alias = "wave", alias = "tap")]
    Ripple,
    Star,
}

impl EffectKind {
    pub const fn all() -> [Self; 3] {
        [Self::Gradient, Self::Ripple, Self::Star]
    }

    pub fn next(self) -> Self {
        match self {
            Self::Gradient => Self::Ripple,
            Self::Ripple => Self::Star,
            Self::Star => Self::Gradient,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Gradient => Self::Star,
            Self::Ripple => Self::Gradient,
            Self::Star => Self::Ripple,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gradient => "Gradient",
            Self::Ripple => "Tap Ripple",
            Self::Star => "Star",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
    Kitty,
}

impl RendererMode {
    /// Surface pixels per terminal cell (columns, rows).
    pub fn pixels_per_cell(self) -> (usize, usize) {
        match self {
            Self::Ascii => (1, 1),
            Self::HalfBlock => (1, 2),
            Self::Braille | Self::Kitty => (2, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineMode {
    Cpu,
    #[value(alias = "gpu")]
    Metal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}
