use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = backdrop_fx::config::Config::parse();
    backdrop_fx::logging::init(cfg.log_file.as_deref(), cfg.log_level)?;
    backdrop_fx::app::run(cfg)
}
