pub mod app;
pub mod capability;
pub mod clock;
pub mod config;
pub mod effects;
pub mod logging;
pub mod render;
pub mod shader;
pub mod sim;
pub mod terminal;
pub mod uniforms;
pub mod visual;
