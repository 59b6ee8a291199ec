use std::fmt;

/// A boxed error type for window operations.
///
/// Any error type that implements the `Error` trait can be boxed into this,
/// so platform crates can surface their own binding errors with `?`.
pub type WindowResult<T> = Result<T, Box<dyn std::error::Error>>;

/// A bring-up step that failed before the message pump could start.
///
/// Both variants are fatal: the pump never enters the running state and no
/// retry is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// The platform refused to register the window class.
    RegisterClass {
        /// Class name that was being registered.
        class: String,
        /// Raw platform error code (`GetLastError()` on Windows).
        code: u32,
    },

    /// The platform returned an invalid handle when creating the window.
    CreateWindow { class: String, code: u32 },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterClass { class, code } => {
                write!(f, "failed to register window class {class:?} (error {code:#010x})")
            }
            Self::CreateWindow { class, code } => {
                write!(f, "failed to create window of class {class:?} (error {code:#010x})")
            }
        }
    }
}

impl std::error::Error for StartupError {}
