//! Headless trace of one effect: prints the uniforms published on every frame
//! and optionally writes the last frame as a PPM.

use anyhow::{bail, Context, Result};
use backdrop_fx::config::EffectKind;
use backdrop_fx::sim::{rasterize, simulate, tsv_header, tsv_row, write_ppm, Point, TriggerScript};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fx_trace", about = "Print per-frame uniforms of an effect under a scripted input")]
struct Cli {
    #[arg(long, value_enum, default_value_t = EffectKind::Gradient)]
    effect: EffectKind,

    #[arg(long, default_value_t = 120)]
    frames: u32,

    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    #[arg(long, default_value_t = 200)]
    width: usize,

    #[arg(long, default_value_t = 200)]
    height: usize,

    /// Tap at frame 0, in surface pixels (`X,Y`).
    #[arg(long, value_name = "X,Y")]
    tap: Option<Point>,

    /// Press the launch button at this frame. Repeatable.
    #[arg(long = "launch-at", value_name = "FRAME")]
    launch_at: Vec<u32>,

    /// Write the last frame as a binary PPM.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.width == 0 || cli.height == 0 {
        bail!("surface must be at least 1x1 (got {}x{})", cli.width, cli.height);
    }

    let mut script = TriggerScript::new();
    if let Some(Point(p)) = cli.tap {
        script = script.tap_at(0, p);
    }
    for &frame in &cli.launch_at {
        script = script.launch_at(frame);
    }

    let resolution = [cli.width as f32, cli.height as f32];
    let records = simulate(cli.effect, &script, cli.frames, cli.fps, resolution);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if let Some(first) = records.first() {
        writeln!(out, "{}", tsv_header(first))?;
    }
    for record in &records {
        writeln!(out, "{}", tsv_row(record))?;
    }
    out.flush()?;

    if let Some(path) = cli.snapshot {
        let Some(last) = records.last() else {
            bail!("--snapshot needs at least one frame");
        };
        let rgba = rasterize(cli.effect, &last.uniforms, cli.width, cli.height);
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        write_ppm(&mut w, &rgba, cli.width, cli.height)
            .with_context(|| format!("write {}", path.display()))?;
        w.flush()?;
    }
    Ok(())
}
