pub mod init;
pub mod replay;
pub mod run;

use minwin_core::{Config, config};

/// Loads the config file and starts file logging if it is enabled.
fn load_config() -> Config {
    let config = config::load();
    minwin_core::log::init(&config.log);
    config
}
