use minwin_core::{
    ClassAtom, ClassRegistration, Message, MessageCode, MessageHandler, Platform, StartupError,
    WindowConfig, WindowHandle, WindowResult, window_proc,
};
use windows::Win32::Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, IDC_ARROW,
    IsWindow, LoadCursorW, MSG, PM_REMOVE, PeekMessageW, PostQuitMessage, RegisterClassExW,
    SW_SHOW, ShowWindow, TranslateMessage, UnregisterClassW, WINDOW_EX_STYLE, WNDCLASS_STYLES,
    WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};
use windows::core::{HSTRING, PCWSTR};

/// The real Win32 windowing surface for the calling thread.
///
/// Must be created and used on the thread that runs the message pump.
pub struct Win32Platform {
    instance: HINSTANCE,
    /// Native form of the last message returned by `peek_message`, so
    /// dispatch sees the original time and cursor position.
    last: Option<MSG>,
}

impl Win32Platform {
    /// Looks up the module instance of the running executable.
    pub fn new() -> WindowResult<Self> {
        // SAFETY: a null module name returns the handle of the .exe itself,
        // valid for the lifetime of the process.
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }?;
        Ok(Self {
            instance: HINSTANCE(module.0),
            last: None,
        })
    }

    fn native(&self, msg: &Message) -> MSG {
        match self.last {
            Some(last) if same_message(&last, msg) => last,
            _ => MSG {
                hwnd: to_hwnd(msg.hwnd),
                message: msg.code.0,
                wParam: WPARAM(msg.wparam),
                lParam: LPARAM(msg.lparam),
                ..Default::default()
            },
        }
    }
}

fn same_message(native: &MSG, msg: &Message) -> bool {
    native.hwnd.0 as usize == msg.hwnd.0
        && native.message == msg.code.0
        && native.wParam.0 == msg.wparam
        && native.lParam.0 == msg.lparam
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut _)
}

fn from_msg(msg: &MSG) -> Message {
    Message {
        hwnd: WindowHandle(msg.hwnd.0 as usize),
        code: MessageCode(msg.message),
        wparam: msg.wParam.0,
        lparam: msg.lParam.0,
    }
}

fn last_error() -> u32 {
    // SAFETY: reads the calling thread's last-error value.
    unsafe { GetLastError() }.0
}

impl Platform for Win32Platform {
    fn register_class(&mut self, class: &ClassRegistration) -> WindowResult<ClassAtom> {
        let name = HSTRING::from(class.class_name.as_str());
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: WNDCLASS_STYLES(class.style.0),
            lpfnWndProc: Some(wnd_proc),
            hInstance: self.instance,
            // SAFETY: IDC_ARROW is a predefined system cursor.
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };

        // SAFETY: `wc` and the class name it points to outlive the call;
        // the system copies the name into the class atom table.
        let atom = unsafe { RegisterClassExW(&wc) };
        if atom == 0 {
            return Err(StartupError::RegisterClass {
                class: class.class_name.clone(),
                code: last_error(),
            }
            .into());
        }
        Ok(ClassAtom(atom))
    }

    fn create_window(
        &mut self,
        class: &ClassRegistration,
        config: &WindowConfig,
    ) -> WindowResult<WindowHandle> {
        let class_name = HSTRING::from(class.class_name.as_str());
        let title = HSTRING::from(config.title.as_str());

        // SAFETY: the class was registered by `register_class` with this
        // instance; both strings are live, null-terminated UTF-16.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                &class_name,
                &title,
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                config.width,
                config.height,
                None,
                None,
                Some(self.instance),
                None,
            )
        };

        match hwnd {
            Ok(h) if !h.is_invalid() => Ok(WindowHandle(h.0 as usize)),
            _ => Err(StartupError::CreateWindow {
                class: class.class_name.clone(),
                code: last_error(),
            }
            .into()),
        }
    }

    fn show_window(&mut self, hwnd: WindowHandle) {
        // SAFETY: hwnd came from `create_window`. The return value is the
        // previous visibility, not an error.
        unsafe {
            let _ = ShowWindow(to_hwnd(hwnd), SW_SHOW);
        }
    }

    fn peek_message(&mut self) -> Option<Message> {
        let mut msg = MSG::default();
        // SAFETY: a `None` window filter reads only the calling thread's
        // queue; PM_REMOVE takes the message off it.
        let found = unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool();
        if !found {
            self.last = None;
            return None;
        }
        self.last = Some(msg);
        Some(from_msg(&msg))
    }

    fn translate_message(&mut self, msg: &Message) -> bool {
        let native = self.native(msg);
        // SAFETY: `native` is a message retrieved from this thread's queue
        // or an equivalent reconstruction.
        unsafe { TranslateMessage(&native) }.as_bool()
    }

    fn dispatch_message(&mut self, msg: &Message) -> isize {
        let native = self.native(msg);
        // SAFETY: as above; DispatchMessageW calls `wnd_proc` synchronously.
        unsafe { DispatchMessageW(&native) }.0
    }

    fn is_window(&self, hwnd: WindowHandle) -> bool {
        // SAFETY: IsWindow accepts any value, including stale handles.
        unsafe { IsWindow(Some(to_hwnd(hwnd))) }.as_bool()
    }

    fn destroy_window(&mut self, hwnd: WindowHandle) {
        // SAFETY: destroys a window owned by this thread. WM_DESTROY is sent
        // to `wnd_proc` before the call returns.
        unsafe {
            let _ = DestroyWindow(to_hwnd(hwnd));
        }
    }

    fn unregister_class(&mut self, class: &ClassRegistration) {
        let name = HSTRING::from(class.class_name.as_str());
        // SAFETY: fails harmlessly if a window of the class still exists.
        if let Err(e) = unsafe { UnregisterClassW(&name, Some(self.instance)) } {
            minwin_core::log_warn!("UnregisterClassW({:?}) failed: {e}", class.class_name);
        }
    }
}

/// Window procedure hooks backed by the Win32 API.
struct Win32Handler {
    hwnd: HWND,
}

impl MessageHandler for Win32Handler {
    fn post_quit(&mut self, exit_code: i32) {
        // SAFETY: posts WM_QUIT to the calling thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }

    fn default_proc(&mut self, msg: &Message) -> isize {
        // SAFETY: forwards the parameters the system handed to `wnd_proc`.
        unsafe {
            DefWindowProcW(
                self.hwnd,
                msg.code.0,
                WPARAM(msg.wparam),
                LPARAM(msg.lparam),
            )
        }
        .0
    }
}

/// WNDPROC registered for every minwin window class.
///
/// Converts the call into a core [`Message`] and routes it through
/// [`window_proc`].
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message {
        hwnd: WindowHandle(hwnd.0 as usize),
        code: MessageCode(msg),
        wparam: wparam.0,
        lparam: lparam.0,
    };
    LRESULT(window_proc(&mut Win32Handler { hwnd }, &message))
}
