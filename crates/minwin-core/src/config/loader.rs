use std::io::ErrorKind;
use std::path::PathBuf;

use super::Config;

/// Returns the config directory: `~/.config/minwin/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("minwin"))
}

/// Returns the config file path: `~/.config/minwin/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Parses and validates a config from TOML text.
pub fn load_from_str(content: &str) -> Result<Config, String> {
    let mut config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
    config.validate();
    Ok(config)
}

/// Tries to load and parse `config.toml`.
///
/// Returns `Ok(None)` when the file does not exist, or an error string
/// describing what went wrong (IO error, parse error, etc.).
pub fn try_load() -> Result<Option<Config>, String> {
    let path = config_path().ok_or("could not determine config path")?;
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("{}: {e}", path.display())),
    };
    load_from_str(&content)
        .map(Some)
        .map_err(|e| format!("{}: {e}", path.display()))
}

/// Loads the configuration from disk, falling back to defaults.
///
/// Missing files silently return defaults; other errors print a warning.
pub fn load() -> Config {
    match try_load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Warning: {e}");
            Config::default()
        }
    }
}
