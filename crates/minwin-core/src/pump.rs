//! Non-blocking message pump.
//!
//! The pump owns one class registration and one window. It polls the
//! calling thread's queue without ever waiting, so a caller can run
//! simulation work between polls (see [`MessagePump::run`]).

use std::marker::PhantomData;

use serde::Serialize;

use crate::config::WindowConfig;
use crate::message::{MessageCode, WindowHandle};
use crate::platform::{ClassRegistration, Platform};
use crate::{WindowResult, log_debug, log_info};

/// Lifecycle of a [`MessagePump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PumpState {
    NotStarted,
    Running,
    /// Terminal. The class has been unregistered.
    Stopped,
}

/// Result of a single [`MessagePump::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No message was pending, or the pump is not running.
    Idle,
    /// A message was translated and dispatched to the window procedure.
    Dispatched { code: MessageCode, result: isize },
    /// A close or quit message was retrieved and the pump stopped.
    Stopped { code: MessageCode },
}

/// Counters reported when the pump exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PumpStats {
    /// Queue checks performed while running.
    pub polls: u64,
    /// Checks that found the queue empty.
    pub idle_polls: u64,
    pub dispatched: u64,
    /// Dispatched messages for which translation queued a character.
    pub translated: u64,
}

/// Drives one window through registration, creation, pumping and cleanup.
///
/// Not `Send`: the queue it reads belongs to the thread that started it.
pub struct MessagePump<P: Platform> {
    platform: P,
    class: ClassRegistration,
    config: WindowConfig,
    hwnd: Option<WindowHandle>,
    state: PumpState,
    stats: PumpStats,
    _thread_bound: PhantomData<*const ()>,
}

impl<P: Platform> MessagePump<P> {
    /// Creates a pump in the `NotStarted` state. Nothing is registered yet.
    pub fn new(platform: P, config: WindowConfig) -> Self {
        Self {
            platform,
            class: ClassRegistration::new(config.class_name.clone()),
            config,
            hwnd: None,
            state: PumpState::NotStarted,
            stats: PumpStats::default(),
            _thread_bound: PhantomData,
        }
    }

    /// Registers the class, creates the window and shows it.
    ///
    /// Any failure is fatal and leaves the pump in `NotStarted`. If the
    /// window cannot be created, the class registration is rolled back
    /// before the error is returned.
    pub fn start(&mut self) -> WindowResult<()> {
        if self.state != PumpState::NotStarted {
            return Err(format!("message pump already {:?}", self.state).into());
        }

        self.platform.register_class(&self.class)?;
        log_debug!("Registered window class {:?}", self.class.class_name);

        let hwnd = match self.platform.create_window(&self.class, &self.config) {
            Ok(hwnd) => hwnd,
            Err(e) => {
                self.platform.unregister_class(&self.class);
                return Err(e);
            }
        };

        self.platform.show_window(hwnd);
        self.hwnd = Some(hwnd);
        self.state = PumpState::Running;
        log_info!(
            "Message pump running (window {:#x}, class {:?})",
            hwnd.0,
            self.class.class_name
        );
        Ok(())
    }

    /// Performs one non-blocking iteration.
    ///
    /// Retrieves at most one message. Close and quit stop the pump without
    /// being dispatched; everything else is translated and dispatched.
    pub fn poll(&mut self) -> PollOutcome {
        if self.state != PumpState::Running {
            return PollOutcome::Idle;
        }

        self.stats.polls += 1;
        let Some(msg) = self.platform.peek_message() else {
            self.stats.idle_polls += 1;
            return PollOutcome::Idle;
        };

        if msg.code.is_terminal() {
            log_info!("Received {}, stopping message pump", msg.code);
            self.stop();
            return PollOutcome::Stopped { code: msg.code };
        }

        if self.platform.translate_message(&msg) {
            self.stats.translated += 1;
        }
        let result = self.platform.dispatch_message(&msg);
        self.stats.dispatched += 1;
        log_debug!("Dispatched {} -> {result}", msg.code);

        PollOutcome::Dispatched {
            code: msg.code,
            result,
        }
    }

    /// Polls until the queue is empty or the pump stops.
    ///
    /// Returns whether the pump is still running. Messages queued after a
    /// terminal message are left untouched.
    pub fn pump_pending(&mut self) -> bool {
        loop {
            match self.poll() {
                PollOutcome::Dispatched { .. } => continue,
                PollOutcome::Idle | PollOutcome::Stopped { .. } => return self.is_running(),
            }
        }
    }

    /// Pumps until the pump stops, calling `on_idle` after each drained batch.
    ///
    /// `on_idle` is where a caller advances its own simulation. The loop
    /// never sleeps: an empty queue is re-polled immediately.
    pub fn run(&mut self, mut on_idle: impl FnMut(&PumpStats)) -> PumpStats {
        while self.pump_pending() {
            on_idle(&self.stats);
        }
        self.stats
    }

    /// Moves the pump to `Stopped`, destroying the window if it is still
    /// alive and unregistering the class. Idempotent.
    pub fn stop(&mut self) {
        match self.state {
            PumpState::Stopped => {}
            PumpState::NotStarted => self.state = PumpState::Stopped,
            PumpState::Running => {
                self.state = PumpState::Stopped;
                if let Some(hwnd) = self.hwnd.take()
                    && self.platform.is_window(hwnd)
                {
                    self.platform.destroy_window(hwnd);
                }
                self.platform.unregister_class(&self.class);
                log_info!(
                    "Unregistered window class {:?} after {} dispatched messages",
                    self.class.class_name,
                    self.stats.dispatched
                );
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == PumpState::Running
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// The window handle, while the pump is running.
    pub fn window(&self) -> Option<WindowHandle> {
        self.hwnd
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

impl<P: Platform> Drop for MessagePump<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::message::Message;
    use crate::platform::ClassAtom;
    use crate::scripted::{FIRST_HWND, PlatformCall, ScriptedPlatform};
    use crate::StartupError;

    /// Scripted platform the test keeps a handle to after the pump is gone.
    struct Shared(Rc<RefCell<ScriptedPlatform>>);

    impl Platform for Shared {
        fn register_class(&mut self, class: &ClassRegistration) -> WindowResult<ClassAtom> {
            self.0.borrow_mut().register_class(class)
        }

        fn create_window(
            &mut self,
            class: &ClassRegistration,
            config: &WindowConfig,
        ) -> WindowResult<WindowHandle> {
            self.0.borrow_mut().create_window(class, config)
        }

        fn show_window(&mut self, hwnd: WindowHandle) {
            self.0.borrow_mut().show_window(hwnd);
        }

        fn peek_message(&mut self) -> Option<Message> {
            self.0.borrow_mut().peek_message()
        }

        fn translate_message(&mut self, msg: &Message) -> bool {
            self.0.borrow_mut().translate_message(msg)
        }

        fn dispatch_message(&mut self, msg: &Message) -> isize {
            self.0.borrow_mut().dispatch_message(msg)
        }

        fn is_window(&self, hwnd: WindowHandle) -> bool {
            self.0.borrow().is_window(hwnd)
        }

        fn destroy_window(&mut self, hwnd: WindowHandle) {
            self.0.borrow_mut().destroy_window(hwnd);
        }

        fn unregister_class(&mut self, class: &ClassRegistration) {
            self.0.borrow_mut().unregister_class(class);
        }
    }

    fn pump_with(codes: &[MessageCode]) -> MessagePump<ScriptedPlatform> {
        let mut pump = MessagePump::new(ScriptedPlatform::with_codes(codes), WindowConfig::default());
        pump.start().unwrap();
        pump
    }

    fn dispatched(pump: &MessagePump<ScriptedPlatform>) -> Vec<MessageCode> {
        pump.platform().dispatched_codes()
    }

    fn unregister_count(pump: &MessagePump<ScriptedPlatform>) -> usize {
        pump.platform().count(|c| matches!(c, PlatformCall::UnregisterClass { .. }))
    }

    #[test]
    fn start_registers_creates_and_shows_in_order() {
        // Arrange
        let mut pump = MessagePump::new(ScriptedPlatform::new(), WindowConfig::default());
        assert_eq!(pump.state(), PumpState::NotStarted);

        // Act
        pump.start().unwrap();

        // Assert
        assert_eq!(pump.state(), PumpState::Running);
        let hwnd = pump.window().unwrap();
        assert_eq!(
            pump.platform().calls(),
            &[
                PlatformCall::RegisterClass {
                    class: "MinwinWindowClass".into()
                },
                PlatformCall::CreateWindow {
                    class: "MinwinWindowClass".into(),
                    title: "minwin".into()
                },
                PlatformCall::ShowWindow { hwnd },
            ]
        );
    }

    #[test]
    fn paint_paint_close_paint_stops_at_close() {
        // Arrange
        use MessageCode as M;
        let mut pump = pump_with(&[M::PAINT, M::PAINT, M::CLOSE, M::PAINT]);

        // Act
        let still_running = pump.pump_pending();

        // Assert
        assert!(!still_running);
        assert_eq!(pump.state(), PumpState::Stopped);
        assert_eq!(dispatched(&pump), vec![M::PAINT, M::PAINT]);
        // Trailing PAINT never retrieved; QUIT was posted by destroying the window.
        assert_eq!(pump.platform().pending_codes(), vec![M::PAINT, M::QUIT]);
        assert_eq!(unregister_count(&pump), 1);
    }

    #[test]
    fn empty_queue_poll_is_an_idle_no_op() {
        // Arrange
        let mut pump = pump_with(&[]);

        // Act
        let outcome = pump.poll();

        // Assert
        assert_eq!(outcome, PollOutcome::Idle);
        assert!(pump.is_running());
        assert!(dispatched(&pump).is_empty());
        assert_eq!(pump.platform().count(|c| matches!(c, PlatformCall::PeekMessage)), 1);
        assert_eq!(pump.stats().idle_polls, 1);
    }

    #[test]
    fn sequence_without_terminal_code_keeps_running() {
        // Arrange
        use MessageCode as M;
        let codes = [M::CREATE, M::SIZE, M::PAINT, M::KEYUP, M::MOUSEMOVE, M::TIMER, M::ACTIVATE];
        let mut pump = pump_with(&codes);

        // Act
        let still_running = pump.pump_pending();

        // Assert
        assert!(still_running);
        assert_eq!(dispatched(&pump), codes.to_vec());
        assert_eq!(unregister_count(&pump), 0);
    }

    #[test]
    fn terminal_code_at_any_position_stops_there() {
        use MessageCode as M;
        for terminal in [M::CLOSE, M::QUIT] {
            for k in 0..5 {
                // Arrange
                let mut codes = vec![M::PAINT; 5];
                codes[k] = terminal;
                let mut pump = pump_with(&codes);

                // Act
                pump.pump_pending();

                // Assert
                assert_eq!(dispatched(&pump).len(), k, "terminal {terminal} at {k}");
                let mut left = vec![M::PAINT; 4 - k];
                left.push(M::QUIT);
                assert_eq!(pump.platform().pending_codes(), left);
                assert!(!pump.is_running());
            }
        }
    }

    #[test]
    fn poll_reports_each_outcome() {
        // Arrange
        use MessageCode as M;
        let mut pump = pump_with(&[M::PAINT, M::QUIT]);

        // Act / Assert
        assert_eq!(
            pump.poll(),
            PollOutcome::Dispatched {
                code: M::PAINT,
                result: 0
            }
        );
        assert_eq!(pump.poll(), PollOutcome::Stopped { code: M::QUIT });
        assert_eq!(pump.poll(), PollOutcome::Idle);
    }

    #[test]
    fn destroy_dispatch_posts_quit_which_stops_the_pump() {
        // Arrange
        let mut pump = pump_with(&[MessageCode::DESTROY]);

        // Act
        let first = pump.poll();
        let second = pump.poll();

        // Assert
        assert!(matches!(first, PollOutcome::Dispatched { result: 0, .. }));
        assert_eq!(
            second,
            PollOutcome::Stopped {
                code: MessageCode::QUIT
            }
        );
    }

    #[test]
    fn unregister_happens_once_and_after_window_is_gone() {
        // Arrange
        let mut pump = pump_with(&[MessageCode::CLOSE]);

        // Act
        pump.pump_pending();
        pump.stop();
        pump.stop();

        // Assert
        assert_eq!(unregister_count(&pump), 1);
        let calls = pump.platform().calls();
        let destroy = calls
            .iter()
            .position(|c| matches!(c, PlatformCall::DestroyWindow { .. }))
            .unwrap();
        let unregister = calls
            .iter()
            .position(|c| matches!(c, PlatformCall::UnregisterClass { .. }))
            .unwrap();
        assert!(destroy < unregister);
        assert!(pump.window().is_none());
    }

    #[test]
    fn already_destroyed_window_is_not_destroyed_again() {
        // Arrange
        let mut pump = pump_with(&[MessageCode::PAINT]);
        let hwnd = pump.window().unwrap();
        pump.platform_mut().destroy_window(hwnd);

        // Act
        pump.stop();

        // Assert
        assert_eq!(
            pump.platform()
                .count(|c| matches!(c, PlatformCall::DestroyWindow { .. })),
            1
        );
        assert_eq!(unregister_count(&pump), 1);
    }

    #[test]
    fn run_calls_idle_hook_until_stopped() {
        // Arrange: the user closes the window after three empty checks
        let mut platform = ScriptedPlatform::with_codes(&[MessageCode::PAINT]);
        platform.close_after_idle_polls(3);
        let mut pump = MessagePump::new(platform, WindowConfig::default());
        pump.start().unwrap();
        let mut ticks = 0;

        // Act
        let stats = pump.run(|_| ticks += 1);

        // Assert
        assert_eq!(ticks, 3);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.idle_polls, 3);
        assert_eq!(stats.polls, 5);
        assert_eq!(pump.state(), PumpState::Stopped);
    }

    #[test]
    fn dropping_a_running_pump_destroys_then_unregisters() {
        // Arrange
        let recorder = Rc::new(RefCell::new(ScriptedPlatform::with_codes(&[
            MessageCode::PAINT,
        ])));
        let mut pump = MessagePump::new(Shared(Rc::clone(&recorder)), WindowConfig::default());
        pump.start().unwrap();
        assert!(pump.pump_pending());

        // Act
        drop(pump);

        // Assert
        let platform = recorder.borrow();
        let calls = platform.calls();
        assert_eq!(
            calls[calls.len() - 2..],
            [
                PlatformCall::DestroyWindow { hwnd: FIRST_HWND },
                PlatformCall::UnregisterClass {
                    class: "MinwinWindowClass".into(),
                    ok: true
                },
            ]
        );
        assert_eq!(
            platform.count(|c| matches!(c, PlatformCall::UnregisterClass { .. })),
            1
        );
        assert!(!platform.is_registered("MinwinWindowClass"));
    }

    #[test]
    fn dropping_a_stopped_pump_does_not_clean_up_twice() {
        // Arrange
        let recorder = Rc::new(RefCell::new(ScriptedPlatform::with_codes(&[
            MessageCode::CLOSE,
        ])));
        let mut pump = MessagePump::new(Shared(Rc::clone(&recorder)), WindowConfig::default());
        pump.start().unwrap();
        assert!(!pump.pump_pending());
        let calls_before_drop = recorder.borrow().calls().len();

        // Act
        drop(pump);

        // Assert
        assert_eq!(recorder.borrow().calls().len(), calls_before_drop);
    }

    #[test]
    fn register_failure_never_starts() {
        // Arrange
        let mut platform = ScriptedPlatform::with_codes(&[MessageCode::PAINT]);
        platform.fail_register = true;
        let mut pump = MessagePump::new(platform, WindowConfig::default());

        // Act
        let err = pump.start().unwrap_err();

        // Assert
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::RegisterClass { .. })
        ));
        assert_eq!(pump.state(), PumpState::NotStarted);
        assert_eq!(pump.poll(), PollOutcome::Idle);
        assert_eq!(pump.platform().calls().len(), 1);
        drop(pump);
    }

    #[test]
    fn create_failure_rolls_back_registration() {
        // Arrange
        let mut platform = ScriptedPlatform::new();
        platform.fail_create = true;
        let mut pump = MessagePump::new(platform, WindowConfig::default());

        // Act
        let err = pump.start().unwrap_err();

        // Assert
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::CreateWindow { .. })
        ));
        assert_eq!(unregister_count(&pump), 1);
        assert_eq!(pump.state(), PumpState::NotStarted);
    }

    #[test]
    fn second_start_is_rejected() {
        // Arrange
        let mut pump = pump_with(&[]);

        // Act
        let result = pump.start();

        // Assert
        assert!(result.is_err());
        assert_eq!(pump.platform().count(|c| matches!(c, PlatformCall::RegisterClass { .. })), 1);
    }

    #[test]
    fn key_down_is_counted_as_translated() {
        // Arrange
        let mut pump = pump_with(&[MessageCode::KEYDOWN, MessageCode::PAINT]);

        // Act
        pump.pump_pending();

        // Assert: translation queues a CHAR right behind the KEYDOWN
        let stats = pump.stats();
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.dispatched, 3);
        assert_eq!(
            dispatched(&pump),
            vec![MessageCode::KEYDOWN, MessageCode::CHAR, MessageCode::PAINT]
        );
    }
}
