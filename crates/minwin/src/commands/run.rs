use clap::Args;
use minwin_core::WindowConfig;

#[derive(Args)]
pub struct RunArgs {
    /// Title bar text (overrides the config file)
    #[arg(long)]
    pub title: Option<String>,
    /// Window width in pixels
    #[arg(long)]
    pub width: Option<i32>,
    /// Window height in pixels
    #[arg(long)]
    pub height: Option<i32>,
    /// Name to register the window class under
    #[arg(long)]
    pub class_name: Option<String>,
}

/// Applies command-line overrides on top of the loaded config.
pub fn window_config(args: &RunArgs) -> WindowConfig {
    let mut config = super::load_config();
    if let Some(title) = &args.title {
        config.window.title = title.clone();
    }
    if let Some(width) = args.width {
        config.window.width = width;
    }
    if let Some(height) = args.height {
        config.window.height = height;
    }
    if let Some(class_name) = &args.class_name {
        config.window.class_name = class_name.clone();
    }
    config.validate();
    config.window
}

pub fn execute(args: &RunArgs) {
    let config = window_config(args);

    #[cfg(windows)]
    match native::run(config) {
        Ok((stats, ticks)) => println!(
            "Window closed: {} polls ({} idle), {} messages dispatched, {ticks} idle ticks.",
            stats.polls, stats.idle_polls, stats.dispatched
        ),
        Err(e) => {
            minwin_core::log_error!("Startup failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        let _ = config;
        eprintln!("Error: native windows are only supported on Windows.");
        eprintln!("Use `minwin replay <MESSAGE>...` to exercise the message pump.");
        std::process::exit(1);
    }
}

#[cfg(windows)]
mod native {
    use minwin_core::{MessagePump, PumpStats, WindowConfig, WindowResult};
    use minwin_windows::{Win32Platform, ctrl_c, dpi};

    /// Brings the window up and pumps until it closes.
    ///
    /// Returns the pump counters and the number of idle ticks, the point at
    /// which a game loop would advance its simulation.
    pub fn run(config: WindowConfig) -> WindowResult<(PumpStats, u64)> {
        if !dpi::declare_per_monitor_aware() {
            minwin_core::log_debug!("DPI awareness was already set for this process");
        }

        let mut pump = MessagePump::new(Win32Platform::new()?, config);
        pump.start()?;
        if let Some(hwnd) = pump.window() {
            ctrl_c::close_on_interrupt(hwnd)?;
        }

        let mut ticks = 0u64;
        let stats = pump.run(|_| ticks += 1);
        Ok((stats, ticks))
    }
}
