//! Win32 implementation of the minwin platform surface.
//!
//! Everything here is compiled on Windows only; on other targets the
//! crate is empty.

/// Ctrl+C handler that closes the window.
#[cfg(windows)]
pub mod ctrl_c;

/// Per-monitor DPI awareness.
#[cfg(windows)]
pub mod dpi;

/// `Platform` over `RegisterClassExW` / `PeekMessageW`.
#[cfg(windows)]
pub mod platform;

#[cfg(windows)]
pub use platform::Win32Platform;
