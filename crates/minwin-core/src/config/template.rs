/// Generates the default `config.toml` contents with explanatory comments.
///
/// This is used by `minwin init` to create a starter config file that
/// users can immediately edit.
pub fn generate_config() -> String {
    r##"# minwin configuration
# Location: ~/.config/minwin/config.toml

[window]
# Title bar text.
title = "minwin"
# Name the window class is registered under.
class_name = "MinwinWindowClass"
# Initial window size in pixels (clamped to 64..=16384).
width = 1280
height = 720

[log]
# Write a log file to ~/.config/minwin/logs/minwin.log.
enabled = false
# Minimum level: "debug", "info", "warn", or "error".
level = "info"
# Rotate the log file after this many megabytes (one backup kept, 0 = never).
max_file_mb = 10
# Write logs somewhere else.
# dir = "C:/Temp/minwin-logs"
"##
    .to_string()
}
