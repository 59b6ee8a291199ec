use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Opts the process into per-monitor (V2) DPI scaling, so the configured
/// width and height are physical pixels and the client area is never
/// bitmap-stretched.
///
/// Must run before the window is created. Returns false when the process
/// already had an awareness context, for instance from its manifest.
pub fn declare_per_monitor_aware() -> bool {
    // SAFETY: the argument is one of the predefined context constants and
    // the call reads no caller memory.
    let result =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awareness_can_only_be_declared_once() {
        // Arrange
        let _ = declare_per_monitor_aware();

        // Act
        let again = declare_per_monitor_aware();

        // Assert
        assert!(!again);
    }
}
