mod loader;
pub mod template;

use serde::{Deserialize, Serialize};

use crate::log::LogConfig;

pub use loader::{config_dir, config_path, load, load_from_str, try_load};

/// Top-level configuration for minwin.
///
/// Loaded from `~/.config/minwin/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window class and window creation parameters.
    pub window: WindowConfig,
    /// File logging.
    pub log: LogConfig,
}

/// Parameters for the window class registration and the window itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text.
    pub title: String,
    /// Name the window class is registered under.
    pub class_name: String,
    /// Initial outer width in pixels.
    pub width: i32,
    /// Initial outer height in pixels.
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "minwin".into(),
            class_name: "MinwinWindowClass".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl Config {
    /// Clamps values to ranges the platform accepts.
    ///
    /// An empty class name is replaced with the default because class
    /// registration rejects it.
    pub fn validate(&mut self) {
        self.window.width = self.window.width.clamp(64, 16_384);
        self.window.height = self.window.height.clamp(64, 16_384);
        if self.window.class_name.trim().is_empty() {
            self.window.class_name = WindowConfig::default().class_name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        // Arrange / Act
        let config = Config::default();

        // Assert
        assert_eq!(config.window.title, "minwin");
        assert_eq!(config.window.class_name, "MinwinWindowClass");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(!config.log.enabled);
    }

    #[test]
    fn partial_toml_uses_defaults_for_missing_fields() {
        // Arrange
        let toml_str = "[window]\ntitle = \"Handmade\"\n";

        // Act
        let config = load_from_str(toml_str).unwrap();

        // Assert
        assert_eq!(config.window.title, "Handmade");
        assert_eq!(config.window.width, 1280); // default
        assert_eq!(config.log.level, crate::log::Level::Info); // default
    }

    #[test]
    fn validate_clamps_extreme_values() {
        // Arrange
        let mut config = Config {
            window: WindowConfig {
                width: -5,
                height: 100_000,
                class_name: "  ".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        // Act
        config.validate();

        // Assert
        assert_eq!(config.window.width, 64);
        assert_eq!(config.window.height, 16_384);
        assert_eq!(config.window.class_name, "MinwinWindowClass");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        // Act
        let result = load_from_str("[window\n");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn template_parses_to_defaults() {
        // Arrange
        let text = template::generate_config();

        // Act
        let config = load_from_str(&text).unwrap();

        // Assert
        assert_eq!(config.window, WindowConfig::default());
        assert!(!config.log.enabled);
    }
}
