use crate::capability::{probe_runtime, CapabilityReport};
use crate::clock::{elapsed_secs, FrameClock, MonotonicClock};
use crate::config::{Config, EffectKind, EngineMode, RendererMode};
use crate::effects::{make_effect, Effect};
use crate::render::{
    AsciiRenderer, BrailleRenderer, Caption, CaptionAnchor, CaptionStyle, Frame, HalfBlockRenderer,
    KittyRenderer, Renderer,
};
use crate::terminal::TerminalGuard;
use crate::uniforms::UniformSet;
use crate::visual::{CpuEngine, VisualEngine};
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::io::BufWriter;
use std::time::{Duration, Instant};

/// Seconds an effect must sit idle before autoplay fires it again.
const AUTOPLAY_IDLE_SECS: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Quit,
    NextScreen,
    PrevScreen,
    Primary,
    ToggleHud,
    ToggleHelp,
}

pub fn key_action(code: KeyCode, mods: KeyModifiers) -> Option<HostAction> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Some(HostAction::Quit);
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(HostAction::Quit),
        KeyCode::Tab | KeyCode::Right => Some(HostAction::NextScreen),
        KeyCode::BackTab | KeyCode::Left => Some(HostAction::PrevScreen),
        KeyCode::Enter | KeyCode::Char(' ') => Some(HostAction::Primary),
        KeyCode::Char('i') | KeyCode::Char('I') => Some(HostAction::ToggleHud),
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            Some(HostAction::ToggleHelp)
        }
        _ => None,
    }
}

/// Surface pixel under the center of a 0-based terminal cell.
pub fn cell_to_pixel(col: u16, row: u16, (px_w_mul, px_h_mul): (usize, usize)) -> [f32; 2] {
    [
        (col as f32 + 0.5) * px_w_mul as f32,
        (row as f32 + 0.5) * px_h_mul as f32,
    ]
}

/// The mounted screen: one effect plus the bookkeeping the host keeps for it.
struct Stage {
    effect: Box<dyn Effect>,
    idle_since_ns: Option<u64>,
}

impl Stage {
    fn mount(kind: EffectKind, now_ns: u64) -> Self {
        log::info!("screen -> {}", kind.label());
        Self {
            effect: make_effect(kind),
            idle_since_ns: Some(now_ns),
        }
    }

    fn kind(&self) -> EffectKind {
        self.effect.kind()
    }

    fn note_activity(&mut self, now_ns: u64) {
        if self.effect.is_active() {
            self.idle_since_ns = None;
        } else if self.idle_since_ns.is_none() {
            self.idle_since_ns = Some(now_ns);
        }
    }

    fn idle_secs(&self, now_ns: u64) -> f32 {
        self.idle_since_ns
            .map(|t| elapsed_secs(t, now_ns))
            .unwrap_or(0.0)
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let mut report = probe_runtime(cfg.engine, cfg.renderer, cfg.auto_probe);
    for note in report.notes() {
        log::info!("probe: {note}");
    }

    let mut engine = make_engine(&mut report);
    let mut renderer = make_renderer(report.renderer);
    let cell = report.renderer.pixels_per_cell();
    log::info!(
        "engine={} renderer={} fps={} adaptive_scale={}",
        engine.name(),
        renderer.name(),
        cfg.fps,
        cfg.adaptive_scale
    );

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);
    resize_engine(&mut *engine, last_size, cell, hud_rows);

    let mut clock = MonotonicClock::new();
    let mut stage = Stage::mount(cfg.effect, clock.now_ns());
    let mut runtime = RuntimeTuning::new(cfg.adaptive_scale);
    let mut fps = FpsCounter::new();
    let mut uniforms = UniformSet::new();
    let mut dirty = true;
    let mut last_engine_ms = 0.0f32;
    let mut last_render_ms = 0.0f32;
    let mut last_total_ms = 0.0f32;
    let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);

    loop {
        let frame_start = Instant::now();
        let now_ns = clock.now_ns();
        let term_cols = last_size.0;
        let visual_rows = last_size.1.saturating_sub(hud_rows).max(1);
        let resolution = surface_resolution(last_size, cell, hud_rows);

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let Some(action) = key_action(k.code, k.modifiers) else {
                        continue;
                    };
                    dirty = true;
                    match action {
                        HostAction::Quit if show_help && k.code == KeyCode::Esc => {
                            show_help = false;
                        }
                        HostAction::Quit => {
                            log::info!("quit");
                            return Ok(());
                        }
                        HostAction::NextScreen => {
                            stage = Stage::mount(stage.kind().next(), now_ns);
                        }
                        HostAction::PrevScreen => {
                            stage = Stage::mount(stage.kind().prev(), now_ns);
                        }
                        HostAction::Primary => {
                            stage.effect.primary_action(resolution);
                        }
                        HostAction::ToggleHud => {
                            show_hud = !show_hud;
                            hud_rows = hud_rows_for_size(last_size, show_hud);
                            resize_engine(&mut *engine, last_size, cell, hud_rows);
                        }
                        HostAction::ToggleHelp => show_help = !show_help,
                    }
                }
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => {
                    if row >= visual_rows {
                        continue;
                    }
                    dirty = true;
                    if on_button(&*stage.effect, column, row, term_cols, visual_rows) {
                        stage.effect.primary_action(resolution);
                    } else {
                        stage.effect.tap(cell_to_pixel(column, row, cell));
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, show_hud);
                    resize_engine(&mut *engine, last_size, cell, hud_rows);
                    dirty = true;
                }
                _ => {}
            }
        }

        // Size check once per frame (resize events can be missed in some terminals).
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            hud_rows = hud_rows_for_size(last_size, show_hud);
            resize_engine(&mut *engine, last_size, cell, hud_rows);
            dirty = true;
        }

        if cfg.autoplay && autoplay_due(&stage, now_ns) {
            fire_autoplay(&mut *stage.effect, resolution);
            dirty = true;
        }

        let animating = stage.effect.wants_frames();
        if animating {
            stage.effect.tick(now_ns);
        }
        stage.note_activity(now_ns);

        // Idle screens only repaint when something changed; the frame after a run
        // ends still draws so the inactive state lands on screen.
        if !animating && !dirty {
            pace(frame_start, target);
            continue;
        }
        dirty = animating;

        let (term_cols, term_rows) = last_size;
        let resolution = surface_resolution(last_size, cell, hud_rows);
        uniforms.clear();
        stage.effect.publish(resolution, &mut uniforms);

        let hud = if show_hud {
            build_wrapped_hud(
                term_cols as usize,
                &HudStatus {
                    kind: stage.kind(),
                    engine: engine.name(),
                    renderer: renderer.name(),
                    fps: fps.fps(),
                    engine_ms: last_engine_ms,
                    render_ms: last_render_ms,
                    total_ms: last_total_ms,
                    scale: runtime.scale,
                    uniforms: &uniforms,
                    probe: &report,
                },
            )
        } else {
            String::new()
        };

        let target_hud_rows = hud_rows_for_text(term_rows, show_hud, &hud);
        if target_hud_rows != hud_rows {
            hud_rows = target_hud_rows;
            resize_engine(&mut *engine, last_size, cell, hud_rows);
            // Uniforms for this frame were published for the old surface.
            uniforms.clear();
            stage
                .effect
                .publish(surface_resolution(last_size, cell, hud_rows), &mut uniforms);
        }
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let (w, h) = engine.size();

        let captions = build_captions(&*stage.effect);
        let overlay = show_help.then(help_popup_text);

        let engine_start = Instant::now();
        let pixels = engine.render(stage.kind(), &uniforms, runtime.scale);
        last_engine_ms = engine_start.elapsed().as_secs_f32() * 1000.0;

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            captions: &captions,
            overlay,
            sync_updates: cfg.sync_updates,
        };

        let render_start = Instant::now();
        renderer.render(&frame, &mut out)?;
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;
        last_total_ms = frame_start.elapsed().as_secs_f32() * 1000.0;

        fps.tick();
        if let Some(scale) = runtime.update(last_total_ms, 1000.0 / cfg.fps as f32) {
            log::debug!("internal scale -> {scale}x (ema {:.1} ms)", runtime.ema_ms);
        }

        pace(frame_start, target);
    }
}

fn pace(frame_start: Instant, target: Duration) {
    let elapsed = frame_start.elapsed();
    if elapsed < target {
        std::thread::sleep(target - elapsed);
    }
}

fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    }
}

fn make_engine(report: &mut CapabilityReport) -> Box<dyn VisualEngine> {
    if report.engine == EngineMode::Metal {
        #[cfg(target_os = "macos")]
        {
            match crate::visual::MetalEngine::new() {
                Ok(engine) => return Box::new(engine),
                Err(err) => {
                    log::warn!("metal init failed: {err:#}");
                    report.record_engine_fallback(
                        EngineMode::Cpu,
                        format!("metal init failed ({err}); falling back to cpu engine"),
                    );
                }
            }
        }

        #[cfg(not(target_os = "macos"))]
        {
            report.record_engine_fallback(
                EngineMode::Cpu,
                "metal engine unsupported on this platform; using cpu engine",
            );
        }
    }
    Box::new(CpuEngine::new())
}

fn surface_resolution(size: (u16, u16), (px_w_mul, px_h_mul): (usize, usize), hud_rows: u16) -> [f32; 2] {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    [
        (cols as usize * px_w_mul) as f32,
        (visual_rows as usize * px_h_mul) as f32,
    ]
}

fn resize_engine(engine: &mut dyn VisualEngine, size: (u16, u16), cell: (usize, usize), hud_rows: u16) {
    let [w, h] = surface_resolution(size, cell, hud_rows);
    log::debug!("resize {}x{} cells -> {}x{} px", size.0, size.1, w, h);
    engine.resize(w as usize, h as usize);
}

fn build_captions(effect: &dyn Effect) -> Vec<Caption<'static>> {
    let mut captions = Vec::with_capacity(2);
    if let Some(text) = effect.caption() {
        captions.push(Caption {
            text,
            anchor: CaptionAnchor::Center,
            style: CaptionStyle::Plain,
        });
    }
    if let Some(text) = effect.button_label() {
        captions.push(Caption {
            text,
            anchor: CaptionAnchor::Bottom,
            style: CaptionStyle::Button {
                enabled: !effect.is_active(),
            },
        });
    }
    captions
}

/// Whether a click at a 0-based cell lands on the screen's button.
fn on_button(effect: &dyn Effect, col: u16, row: u16, cols: u16, visual_rows: u16) -> bool {
    let Some(text) = effect.button_label() else {
        return false;
    };
    let button = Caption {
        text,
        anchor: CaptionAnchor::Bottom,
        style: CaptionStyle::Button { enabled: true },
    };
    let (start, end) = button.span(cols);
    row + 1 == button.row(visual_rows) && (start..=end).contains(&(col + 1))
}

fn autoplay_due(stage: &Stage, now_ns: u64) -> bool {
    stage.kind() != EffectKind::Gradient
        && !stage.effect.is_active()
        && stage.idle_secs(now_ns) >= AUTOPLAY_IDLE_SECS
}

fn fire_autoplay(effect: &mut dyn Effect, resolution: [f32; 2]) {
    match effect.kind() {
        EffectKind::Ripple => {
            let point = [
                fastrand::f32() * resolution[0],
                fastrand::f32() * resolution[1],
            ];
            effect.tap(point);
        }
        EffectKind::Star => {
            effect.primary_action(resolution);
        }
        EffectKind::Gradient => {}
    }
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud {
        return 0;
    }
    let rows = size.1;
    if rows <= 1 {
        return 0;
    }
    (rows - 1).min(4)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    let wanted = hud.lines().count() as u16;
    wanted.min(max_rows)
}

struct HudStatus<'a> {
    kind: EffectKind,
    engine: &'a str,
    renderer: &'a str,
    fps: f32,
    engine_ms: f32,
    render_ms: f32,
    total_ms: f32,
    scale: usize,
    uniforms: &'a UniformSet,
    probe: &'a CapabilityReport,
}

fn build_wrapped_hud(cols: usize, s: &HudStatus<'_>) -> String {
    let screen_idx = EffectKind::all()
        .iter()
        .position(|k| *k == s.kind)
        .map(|i| i + 1)
        .unwrap_or(0);
    let logical_lines = vec![
        format!(
            "Screen: {} ({}/{}) | Engine: {} | Renderer: {} | Scale: {}x | FPS: {:>4.1} | ms(E/R/T): {:>4.1}/{:>4.1}/{:>4.1}",
            s.kind.label(),
            screen_idx,
            EffectKind::all().len(),
            s.engine,
            s.renderer,
            s.scale,
            s.fps,
            s.engine_ms,
            s.render_ms,
            s.total_ms,
        ),
        s.uniforms.summary(),
        format!("Probe: {}", s.probe.status_label()),
        "Keys: tab/→ next | shift-tab/← prev | enter/space action | click tap | i HUD | ?/h help | q quit"
            .to_string(),
    ];

    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        out.extend(hard_wrap_line(line, width));
    }
    out
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn help_popup_text() -> &'static str {
    "Backdrop FX Hotkeys\n\
tab or →  next screen (gradient / ripple / star)\n\
shift-tab or ←  previous screen\n\
enter or space  screen action (ripple again / launch star)\n\
left click  tap: start a ripple at the pointer\n\
click the button  launch the star\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

/// Internal downscale driven by an EMA of frame time.
struct RuntimeTuning {
    scale: usize,
    adaptive: bool,
    ema_ms: f32,
    cooldown: u32,
}

impl RuntimeTuning {
    const MAX_SCALE: usize = 3;
    /// Frames to wait after a scale change before judging the new one.
    const SETTLE_FRAMES: u32 = 30;

    fn new(adaptive: bool) -> Self {
        Self {
            scale: 1,
            adaptive,
            ema_ms: 0.0,
            cooldown: 0,
        }
    }

    /// Returns the new scale when it changed.
    fn update(&mut self, frame_ms: f32, target_ms: f32) -> Option<usize> {
        if !self.adaptive {
            return None;
        }
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.ema_ms * 0.95 + frame_ms * 0.05
        };
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }

        let next = if self.ema_ms > target_ms * 1.22 && self.scale < Self::MAX_SCALE {
            self.scale + 1
        } else if self.ema_ms < target_ms * 0.72 && self.scale > 1 {
            self.scale - 1
        } else {
            return None;
        };
        self.scale = next;
        self.cooldown = Self::SETTLE_FRAMES;
        Some(next)
    }
}
