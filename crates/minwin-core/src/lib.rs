pub mod config;
pub mod error;
pub mod log;
pub mod message;
pub mod platform;
pub mod procedure;
pub mod pump;
pub mod scripted;

pub use config::{Config, WindowConfig};
pub use error::{StartupError, WindowResult};
pub use message::{Message, MessageCode, WindowHandle};
pub use platform::{ClassAtom, ClassRegistration, ClassStyle, Platform};
pub use procedure::{MessageHandler, window_proc};
pub use pump::{MessagePump, PollOutcome, PumpState, PumpStats};
pub use scripted::{PlatformCall, ScriptedPlatform};
