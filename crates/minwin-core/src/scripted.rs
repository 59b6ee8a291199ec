//! A [`Platform`] that replays a fixed message sequence.
//!
//! Every platform call is recorded so the pump's behavior can be checked
//! on any host, and so `minwin replay` can show what a real window would
//! have gone through.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::config::WindowConfig;
use crate::message::{Message, MessageCode, WindowHandle};
use crate::platform::{ClassAtom, ClassRegistration, Platform};
use crate::procedure::{MessageHandler, window_proc};
use crate::{StartupError, WindowResult};

/// Handle given to the first window a scripted platform creates.
pub const FIRST_HWND: WindowHandle = WindowHandle(0x1000);

// Win32 error codes reported for injected failures.
const ERROR_CLASS_ALREADY_EXISTS: u32 = 1410;
const ERROR_CANNOT_FIND_WND_CLASS: u32 = 1407;

/// One recorded call into the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PlatformCall {
    RegisterClass { class: String },
    CreateWindow { class: String, title: String },
    ShowWindow { hwnd: WindowHandle },
    PeekMessage,
    TranslateMessage { code: MessageCode },
    DispatchMessage { code: MessageCode },
    DestroyWindow { hwnd: WindowHandle },
    /// `ok` is false when a live window still referenced the class.
    UnregisterClass { class: String, ok: bool },
}

/// Scripted stand-in for the operating system.
#[derive(Debug)]
pub struct ScriptedPlatform {
    queue: VecDeque<Message>,
    calls: Vec<PlatformCall>,
    registered: HashSet<String>,
    windows: HashMap<WindowHandle, String>,
    next_hwnd: usize,
    close_after_idle: Option<u64>,
    idle_peeks: u64,
    /// Makes `register_class` fail.
    pub fail_register: bool,
    /// Makes `create_window` fail.
    pub fail_create: bool,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            calls: Vec::new(),
            registered: HashSet::new(),
            windows: HashMap::new(),
            next_hwnd: FIRST_HWND.0,
            close_after_idle: None,
            idle_peeks: 0,
            fail_register: false,
            fail_create: false,
        }
    }

    /// Queues one message per code, all targeting [`FIRST_HWND`].
    pub fn with_codes(codes: &[MessageCode]) -> Self {
        let mut platform = Self::new();
        for &code in codes {
            platform.push(Message::new(FIRST_HWND, code));
        }
        platform
    }

    /// Appends a message to the queue.
    pub fn push(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Delivers a CLOSE once the queue has been found empty `polls` times,
    /// the way a user would close the window while the caller is idle.
    pub fn close_after_idle_polls(&mut self, polls: u64) {
        self.close_after_idle = Some(polls);
    }

    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Codes passed to `dispatch_message`, in order.
    pub fn dispatched_codes(&self) -> Vec<MessageCode> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PlatformCall::DispatchMessage { code } => Some(*code),
                _ => None,
            })
            .collect()
    }

    /// Codes of the messages still waiting in the queue, front first.
    pub fn pending_codes(&self) -> Vec<MessageCode> {
        self.queue.iter().map(|m| m.code).collect()
    }

    pub fn is_registered(&self, class_name: &str) -> bool {
        self.registered.contains(class_name)
    }
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Window procedure hooks backed by the scripted queue.
struct QueueHandler<'a> {
    queue: &'a mut VecDeque<Message>,
}

impl MessageHandler for QueueHandler<'_> {
    fn post_quit(&mut self, exit_code: i32) {
        let mut quit = Message::thread(MessageCode::QUIT);
        quit.wparam = exit_code as usize;
        self.queue.push_back(quit);
    }

    fn default_proc(&mut self, _msg: &Message) -> isize {
        0
    }
}

impl Platform for ScriptedPlatform {
    fn register_class(&mut self, class: &ClassRegistration) -> WindowResult<ClassAtom> {
        self.calls.push(PlatformCall::RegisterClass {
            class: class.class_name.clone(),
        });
        if self.fail_register || !self.registered.insert(class.class_name.clone()) {
            return Err(StartupError::RegisterClass {
                class: class.class_name.clone(),
                code: ERROR_CLASS_ALREADY_EXISTS,
            }
            .into());
        }
        // Atoms start at 0xC000 for registered window classes.
        Ok(ClassAtom(0xC000 + self.registered.len() as u16))
    }

    fn create_window(
        &mut self,
        class: &ClassRegistration,
        config: &WindowConfig,
    ) -> WindowResult<WindowHandle> {
        self.calls.push(PlatformCall::CreateWindow {
            class: class.class_name.clone(),
            title: config.title.clone(),
        });
        if self.fail_create || !self.registered.contains(&class.class_name) {
            return Err(StartupError::CreateWindow {
                class: class.class_name.clone(),
                code: ERROR_CANNOT_FIND_WND_CLASS,
            }
            .into());
        }
        let hwnd = WindowHandle(self.next_hwnd);
        self.next_hwnd += 1;
        self.windows.insert(hwnd, class.class_name.clone());
        Ok(hwnd)
    }

    fn show_window(&mut self, hwnd: WindowHandle) {
        self.calls.push(PlatformCall::ShowWindow { hwnd });
    }

    fn peek_message(&mut self) -> Option<Message> {
        self.calls.push(PlatformCall::PeekMessage);
        if let Some(msg) = self.queue.pop_front() {
            return Some(msg);
        }
        match self.close_after_idle {
            Some(limit) if self.idle_peeks >= limit => {
                self.close_after_idle = None;
                Some(Message::new(FIRST_HWND, MessageCode::CLOSE))
            }
            _ => {
                self.idle_peeks += 1;
                None
            }
        }
    }

    fn translate_message(&mut self, msg: &Message) -> bool {
        self.calls.push(PlatformCall::TranslateMessage { code: msg.code });
        if !msg.code.is_key_down() {
            return false;
        }
        let mut ch = Message::new(msg.hwnd, MessageCode::CHAR);
        ch.wparam = msg.wparam;
        self.queue.push_front(ch);
        true
    }

    fn dispatch_message(&mut self, msg: &Message) -> isize {
        self.calls.push(PlatformCall::DispatchMessage { code: msg.code });
        let mut handler = QueueHandler {
            queue: &mut self.queue,
        };
        window_proc(&mut handler, msg)
    }

    fn is_window(&self, hwnd: WindowHandle) -> bool {
        self.windows.contains_key(&hwnd)
    }

    fn destroy_window(&mut self, hwnd: WindowHandle) {
        if self.windows.remove(&hwnd).is_none() {
            return;
        }
        self.calls.push(PlatformCall::DestroyWindow { hwnd });
        // DestroyWindow sends DESTROY straight to the window procedure.
        let mut handler = QueueHandler {
            queue: &mut self.queue,
        };
        window_proc(&mut handler, &Message::new(hwnd, MessageCode::DESTROY));
    }

    fn unregister_class(&mut self, class: &ClassRegistration) {
        let in_use = self.windows.values().any(|c| *c == class.class_name);
        let ok = !in_use && self.registered.remove(&class.class_name);
        self.calls.push(PlatformCall::UnregisterClass {
            class: class.class_name.clone(),
            ok,
        });
    }
}
