//! Logging setup. The terminal owns stdout/stderr while the surface is drawn,
//! so records only go somewhere when `--log-file` is given.

use crate::config::LogLevel;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

pub fn init(log_file: Option<&Path>, level: LogLevel) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        log::set_max_level(log::LevelFilter::Off);
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.filter())
        .format_timestamp_millis()
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)));
    // RUST_LOG directives refine the level flag.
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.try_init().context("install logger")?;

    log::info!("logging to {} at {:?}", path.display(), level);
    Ok(())
}
