mod config;
mod render;
mod watch;

pub use config::{default_config_path, CliConfig};
pub use render::{render_item, render_panel};
pub use watch::{run_watch, PrintNavigator, WatchCommand};
