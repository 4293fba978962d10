use backdrop_fx::capability::{probe_with_env, TermEnv};
use backdrop_fx::config::{Config, EffectKind, EngineMode, LogLevel, RendererMode};
use clap::Parser;

fn parse(args: &[&str]) -> Result<Config, clap::Error> {
    Config::try_parse_from(std::iter::once("backdrop-fx").chain(args.iter().copied()))
}

#[test]
fn defaults_are_gradient_cpu_halfblock() {
    let cfg = parse(&[]).unwrap();
    assert_eq!(cfg.effect, EffectKind::Gradient);
    assert_eq!(cfg.engine, EngineMode::Cpu);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.fps, 60);
    assert!(cfg.adaptive_scale);
    assert!(cfg.sync_updates);
    assert!(cfg.auto_probe);
    assert!(!cfg.autoplay);
    assert!(cfg.log_file.is_none());
    assert_eq!(cfg.log_level, LogLevel::Info);
}

#[test]
fn value_aliases_resolve() {
    let cfg = parse(&["--effect", "wave", "--engine", "gpu", "--renderer", "hb"]).unwrap();
    assert_eq!(cfg.effect, EffectKind::Ripple);
    assert_eq!(cfg.engine, EngineMode::Metal);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);

    let cfg = parse(&["--effect", "star", "--renderer", "dots"]).unwrap();
    assert_eq!(cfg.effect, EffectKind::Star);
    assert_eq!(cfg.renderer, RendererMode::Braille);
}

#[test]
fn fps_must_be_positive() {
    assert!(parse(&["--fps", "0"]).is_err());
    assert_eq!(parse(&["--fps", "30"]).unwrap().fps, 30);
}

#[test]
fn boolean_switches_take_values() {
    let cfg = parse(&["--adaptive-scale", "false", "--auto-probe", "false", "--autoplay"]).unwrap();
    assert!(!cfg.adaptive_scale);
    assert!(!cfg.auto_probe);
    assert!(cfg.autoplay);
}

#[test]
fn log_flags_parse() {
    let cfg = parse(&["--log-file", "/tmp/fx.log", "--log-level", "debug"]).unwrap();
    assert_eq!(cfg.log_file.as_deref(), Some(std::path::Path::new("/tmp/fx.log")));
    assert_eq!(cfg.log_level.filter(), log::LevelFilter::Debug);
}

#[test]
fn screens_cycle_in_both_directions() {
    for kind in EffectKind::all() {
        assert_eq!(kind.next().prev(), kind);
    }
    assert_eq!(EffectKind::Star.next(), EffectKind::Gradient);
    assert_eq!(EffectKind::Gradient.prev(), EffectKind::Star);
}

#[test]
fn pixels_per_cell_per_renderer() {
    assert_eq!(RendererMode::Ascii.pixels_per_cell(), (1, 1));
    assert_eq!(RendererMode::HalfBlock.pixels_per_cell(), (1, 2));
    assert_eq!(RendererMode::Braille.pixels_per_cell(), (2, 4));
    assert_eq!(RendererMode::Kitty.pixels_per_cell(), (2, 4));
}

// ── Capability probe ────────────────────────────────────────────────────────

fn plain_term() -> TermEnv {
    TermEnv {
        term: "xterm-256color".to_string(),
        ..TermEnv::default()
    }
}

#[test]
fn kitty_falls_back_to_halfblock_without_graphics() {
    let report = probe_with_env(EngineMode::Cpu, RendererMode::Kitty, true, &plain_term());
    assert_eq!(report.renderer, RendererMode::HalfBlock);
    assert!(report.changed());
    assert!(report.status_label().starts_with("fallback"));
}

#[test]
fn kitty_kept_when_terminal_supports_it() {
    let env = TermEnv {
        kitty_window_id: true,
        ..TermEnv::default()
    };
    let report = probe_with_env(EngineMode::Cpu, RendererMode::Kitty, true, &env);
    assert_eq!(report.renderer, RendererMode::Kitty);
    assert!(!report.changed());
}

#[test]
fn forced_kitty_env_overrides_detection() {
    let env = TermEnv {
        force_kitty: Some("off".to_string()),
        term: "xterm-kitty".to_string(),
        ..TermEnv::default()
    };
    assert!(!env.kitty_graphics_available());
    let env = TermEnv {
        force_kitty: Some("1".to_string()),
        ..plain_term()
    };
    assert!(env.kitty_graphics_available());
}

#[test]
fn probe_disabled_keeps_request() {
    let report = probe_with_env(EngineMode::Metal, RendererMode::Kitty, false, &plain_term());
    assert_eq!(report.engine, EngineMode::Metal);
    assert_eq!(report.renderer, RendererMode::Kitty);
    assert!(report.status_label().starts_with("off"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn metal_falls_back_to_cpu_off_macos() {
    let report = probe_with_env(EngineMode::Metal, RendererMode::HalfBlock, true, &plain_term());
    assert_eq!(report.engine, EngineMode::Cpu);
    assert!(report.notes().iter().any(|n| n.contains("metal")));
}

#[test]
fn engine_fallback_is_recorded() {
    let mut report = probe_with_env(EngineMode::Cpu, RendererMode::Ascii, true, &plain_term());
    report.record_engine_fallback(EngineMode::Cpu, "metal init failed");
    assert!(report.notes().iter().any(|n| n == "metal init failed"));
}
