mod app;
mod config;
mod effects;
mod export;
mod ui;

pub use app::{run_interactive, run_once, SessionOptions};
pub use config::{load_config, DiggerConfig, DEFAULT_CONFIG_FILENAME};
