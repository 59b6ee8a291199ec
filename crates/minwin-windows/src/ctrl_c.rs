//! Ctrl+C handling using `SetConsoleCtrlHandler`.
//!
//! The console handler runs on a system thread, so it cannot touch the
//! pump. It posts `WM_CLOSE` to the window instead; the pump then sees a
//! close message on its own queue and stops normally.

use std::sync::OnceLock;

use minwin_core::{WindowHandle, WindowResult};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT, SetConsoleCtrlHandler};
use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_CLOSE};

/// Window to close, written once by `close_on_interrupt`.
static TARGET: OnceLock<usize> = OnceLock::new();

/// Registers a Ctrl+C / Ctrl+Break handler that posts `WM_CLOSE` to `hwnd`.
///
/// Only the first call takes effect.
pub fn close_on_interrupt(hwnd: WindowHandle) -> WindowResult<()> {
    if TARGET.set(hwnd.0).is_err() {
        return Ok(());
    }
    unsafe { SetConsoleCtrlHandler(Some(handler), true) }?;
    Ok(())
}

unsafe extern "system" fn handler(ctrl_type: u32) -> windows::core::BOOL {
    if (ctrl_type == CTRL_C_EVENT || ctrl_type == CTRL_BREAK_EVENT)
        && let Some(&hwnd) = TARGET.get()
    {
        // SAFETY: posting to a destroyed window fails harmlessly.
        unsafe {
            let _ = PostMessageW(Some(HWND(hwnd as *mut _)), WM_CLOSE, WPARAM(0), LPARAM(0));
        }
        return windows::core::BOOL(1);
    }
    windows::core::BOOL(0)
}
