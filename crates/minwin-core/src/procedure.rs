//! The window procedure shared by every platform.

use crate::message::{Message, MessageCode};

/// Platform hooks the window procedure needs.
pub trait MessageHandler {
    /// Posts a QUIT message to the calling thread's queue.
    fn post_quit(&mut self, exit_code: i32);

    /// Runs the platform's default handling and returns its result.
    fn default_proc(&mut self, msg: &Message) -> isize;
}

/// Handles one message directed at the window.
///
/// DESTROY posts quit intent and returns 0. Everything else is forwarded
/// to the default handler and its result returned unchanged.
pub fn window_proc<H: MessageHandler + ?Sized>(handler: &mut H, msg: &Message) -> isize {
    if msg.code == MessageCode::DESTROY {
        crate::log_debug!("WM_DESTROY for {:#x}, posting quit", msg.hwnd.0);
        handler.post_quit(0);
        return 0;
    }
    handler.default_proc(msg)
}
