use crate::config::{EngineMode, RendererMode};

#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_probe: bool,
    pub requested_engine: EngineMode,
    pub requested_renderer: RendererMode,
    pub engine: EngineMode,
    pub renderer: RendererMode,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn changed(&self) -> bool {
        self.engine != self.requested_engine || self.renderer != self.requested_renderer
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// The engine failed to come up after probing; record what replaced it.
    pub fn record_engine_fallback(&mut self, to: EngineMode, reason: impl Into<String>) {
        self.engine = to;
        self.notes.push(reason.into());
    }

    pub fn status_label(&self) -> String {
        if !self.auto_probe {
            return format!("off (engine={:?}, renderer={:?})", self.engine, self.renderer);
        }
        if self.changed() {
            return format!(
                "fallback eng {:?}->{:?}, ren {:?}->{:?}",
                self.requested_engine, self.engine, self.requested_renderer, self.renderer
            );
        }
        format!("ok eng={:?}, ren={:?}", self.engine, self.renderer)
    }
}

/// Terminal identity used to decide whether kitty graphics can be displayed.
#[derive(Debug, Clone, Default)]
pub struct TermEnv {
    pub force_kitty: Option<String>,
    pub kitty_window_id: bool,
    pub term: String,
    pub term_program: String,
}

impl TermEnv {
    pub fn from_process() -> Self {
        Self {
            force_kitty: std::env::var("BACKDROP_FORCE_KITTY").ok(),
            kitty_window_id: std::env::var_os("KITTY_WINDOW_ID").is_some(),
            term: std::env::var("TERM").unwrap_or_default(),
            term_program: std::env::var("TERM_PROGRAM").unwrap_or_default(),
        }
    }

    pub fn kitty_graphics_available(&self) -> bool {
        if let Some(v) = &self.force_kitty {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => return true,
                "0" | "false" | "no" | "off" => return false,
                _ => {}
            }
        }
        if self.kitty_window_id {
            return true;
        }
        if self.term.to_ascii_lowercase().contains("kitty") {
            return true;
        }
        let program = self.term_program.to_ascii_lowercase();
        program.contains("ghostty") || program.contains("kitty") || program.contains("wezterm")
    }
}

pub fn probe_runtime(
    requested_engine: EngineMode,
    requested_renderer: RendererMode,
    auto_probe: bool,
) -> CapabilityReport {
    probe_with_env(
        requested_engine,
        requested_renderer,
        auto_probe,
        &TermEnv::from_process(),
    )
}

pub fn probe_with_env(
    requested_engine: EngineMode,
    requested_renderer: RendererMode,
    auto_probe: bool,
    env: &TermEnv,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        auto_probe,
        requested_engine,
        requested_renderer,
        engine: requested_engine,
        renderer: requested_renderer,
        notes: Vec::new(),
    };

    if !auto_probe {
        report.push_note("capability probe disabled by --auto-probe=false");
        return report;
    }

    if requested_renderer == RendererMode::Kitty && !env.kitty_graphics_available() {
        report.renderer = RendererMode::HalfBlock;
        report.push_note("kitty graphics unavailable in this terminal; falling back to half-block renderer");
    }

    if requested_engine == EngineMode::Metal {
        #[cfg(not(target_os = "macos"))]
        {
            report.engine = EngineMode::Cpu;
            report.push_note("metal engine unsupported on this platform; falling back to cpu engine");
        }

        #[cfg(target_os = "macos")]
        {
            report.push_note("metal runtime validation pending during engine initialization");
        }
    }

    if report.notes.is_empty() {
        report.push_note("probe selected requested engine/renderer with no fallback");
    }

    report
}
