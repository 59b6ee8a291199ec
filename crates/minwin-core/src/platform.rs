use crate::config::WindowConfig;
use crate::message::{Message, WindowHandle};
use crate::WindowResult;

/// Window class style bits, using the Win32 `CS_*` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassStyle(pub u32);

impl ClassStyle {
    pub const VREDRAW: Self = Self(0x0001);
    pub const HREDRAW: Self = Self(0x0002);
    pub const OWNDC: Self = Self(0x0020);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ClassStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A window class descriptor.
///
/// The window procedure is not stored here: every platform routes its
/// windows through [`crate::procedure::window_proc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRegistration {
    pub class_name: String,
    pub style: ClassStyle,
}

impl ClassRegistration {
    /// Redraw on resize, private device context.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            style: ClassStyle::HREDRAW | ClassStyle::VREDRAW | ClassStyle::OWNDC,
        }
    }
}

/// Identifier the platform returns for a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassAtom(pub u16);

/// The operating-system windowing surface the message pump drives.
///
/// Every method is called from the thread that created the pump, and
/// `peek_message` must only ever read that thread's queue.
pub trait Platform {
    /// Registers a window class. Must succeed before `create_window`.
    fn register_class(&mut self, class: &ClassRegistration) -> WindowResult<ClassAtom>;

    /// Creates a window of a previously registered class.
    fn create_window(
        &mut self,
        class: &ClassRegistration,
        config: &WindowConfig,
    ) -> WindowResult<WindowHandle>;

    /// Makes the window visible.
    fn show_window(&mut self, hwnd: WindowHandle);

    /// Removes and returns the next pending message, without blocking.
    fn peek_message(&mut self) -> Option<Message>;

    /// Normalizes key input. Returns true if a character message was queued.
    fn translate_message(&mut self, msg: &Message) -> bool;

    /// Sends the message to the window procedure and returns its result.
    fn dispatch_message(&mut self, msg: &Message) -> isize;

    /// Returns whether the handle still refers to a live window.
    fn is_window(&self, hwnd: WindowHandle) -> bool;

    fn destroy_window(&mut self, hwnd: WindowHandle);

    /// Unregisters a class. No window of the class may still exist.
    fn unregister_class(&mut self, class: &ClassRegistration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registration_uses_redraw_and_own_dc() {
        // Act
        let class = ClassRegistration::new("Demo");

        // Assert
        assert_eq!(class.class_name, "Demo");
        assert!(class.style.contains(ClassStyle::HREDRAW));
        assert!(class.style.contains(ClassStyle::VREDRAW));
        assert!(class.style.contains(ClassStyle::OWNDC));
        assert_eq!(class.style, ClassStyle(0x0023));
    }
}
