/// Page agent: owns zen mode for one loaded page

use crate::error::ZenError;
use crate::protocol::{Reply, Request};
use crate::settings::Preferences;

/// Class added to the page body while zen mode is on
pub const MARKER_CLASS: &str = "excali-zen-mode";

const TITLE_PREFIX: &str = "🧘 Zen Mode - ";

pub const ENABLED_MESSAGE: &str = "Zen mode enabled";
pub const FULLSCREEN_HINT_MESSAGE: &str = "Zen mode enabled. Press F11 for fullscreen";
pub const DISABLED_MESSAGE: &str = "Zen mode disabled";

/// Everything the agent does to the page it lives in
pub trait PageHost {
    /// Held while the cursor hides on idle; dropping it must remove the
    /// pointer listener, cancel the countdown and show the cursor.
    type CursorGuard;

    fn title(&self) -> String;
    fn set_title(&self, title: &str);
    fn add_marker(&self);
    fn remove_marker(&self);
    fn is_fullscreen(&self) -> bool;
    /// Ask for fullscreen. An immediate error means the request never
    /// started; a later refusal by the browser runs `on_denied` instead.
    fn request_fullscreen<F>(&self, on_denied: F) -> Result<(), ZenError>
    where
        F: FnOnce(&Self) + 'static;
    fn exit_fullscreen(&self) -> Result<(), ZenError>;
    fn start_cursor_hiding(&self) -> Self::CursorGuard;
    fn persist_zen_mode(&self, on: bool);
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZenState {
    Inactive,
    Active,
}

/// What caused a transition. Only keyboard shortcuts carry enough user
/// engagement for the fullscreen API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Keyboard,
    Pointer,
}

impl Trigger {
    pub fn from_keyboard(from_keyboard: bool) -> Trigger {
        if from_keyboard {
            Trigger::Keyboard
        } else {
            Trigger::Pointer
        }
    }
}

pub fn decorated_title(original: &str) -> String {
    format!("{}{}", TITLE_PREFIX, original)
}

/// Ctrl/Cmd + Shift + Z
pub fn is_toggle_shortcut(key: &str, ctrl: bool, meta: bool, shift: bool) -> bool {
    (ctrl || meta) && shift && key.eq_ignore_ascii_case("z")
}

pub struct PageAgent<H: PageHost> {
    host: H,
    state: ZenState,
    original_title: String,
    cursor: Option<H::CursorGuard>,
}

impl<H: PageHost + 'static> PageAgent<H> {
    /// Create the agent, capturing the page title as it is right now
    pub fn new(host: H) -> PageAgent<H> {
        let original_title = host.title();
        PageAgent {
            host,
            state: ZenState::Inactive,
            original_title,
            cursor: None,
        }
    }

    /// Re-apply the last persisted state after a page load. Never requests
    /// fullscreen: there is no user gesture on this path.
    pub fn restore(&mut self, persisted_zen_mode: bool, prefs: Preferences) {
        if persisted_zen_mode {
            log::debug!("Restoring zen mode from storage");
            self.enable(Trigger::Pointer, prefs);
        }
    }

    pub fn state(&self) -> ZenState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ZenState::Active
    }

    pub fn original_title(&self) -> &str {
        &self.original_title
    }

    pub fn toggle(&mut self, trigger: Trigger, prefs: Preferences) -> bool {
        match self.state {
            ZenState::Active => self.disable(),
            ZenState::Inactive => self.enable(trigger, prefs),
        }
        self.is_active()
    }

    pub fn enable(&mut self, trigger: Trigger, prefs: Preferences) {
        self.state = ZenState::Active;
        self.host.add_marker();

        let wants_fullscreen = prefs.should_enter_fullscreen();
        let requested = wants_fullscreen && trigger == Trigger::Keyboard && self.enter_fullscreen();

        self.host.set_title(&decorated_title(&self.original_title));

        // Release any previous guard before arming a new one.
        drop(self.cursor.take());
        self.cursor = Some(self.host.start_cursor_hiding());

        self.host.persist_zen_mode(true);

        let message = if wants_fullscreen && !requested {
            FULLSCREEN_HINT_MESSAGE
        } else {
            ENABLED_MESSAGE
        };
        self.host.notify(message);
    }

    pub fn disable(&mut self) {
        self.state = ZenState::Inactive;
        self.host.remove_marker();

        if self.host.is_fullscreen() {
            if let Err(e) = self.host.exit_fullscreen() {
                log::warn!("Could not exit fullscreen: {}", e);
            }
        }

        self.host.set_title(&self.original_title);
        self.cursor = None;
        self.host.persist_zen_mode(false);
        self.host.notify(DISABLED_MESSAGE);
    }

    /// Answer the read-only requests; mutations go through `toggle`
    pub fn respond(&self, request: &Request) -> Option<Reply> {
        match request {
            Request::GetZenState => Some(Reply::zen_state(self.is_active())),
            Request::Ping => Some(Reply::pong()),
            Request::ToggleZenMode { .. } | Request::UpdateCustomDomains { .. } => None,
        }
    }

    fn enter_fullscreen(&self) -> bool {
        let denied = |host: &H| {
            log::warn!("Fullscreen request denied by the browser");
            host.notify(FULLSCREEN_HINT_MESSAGE);
        };
        match self.host.request_fullscreen(denied) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Fullscreen request failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct PageLog {
        title: String,
        marker: bool,
        fullscreen: bool,
        fullscreen_supported: bool,
        fullscreen_denied: bool,
        fullscreen_requests: usize,
        persisted: Vec<bool>,
        notifications: Vec<String>,
        guards_started: usize,
    }

    type Denial = Box<dyn FnOnce(&FakePage)>;

    #[derive(Clone, Default)]
    struct FakePage {
        log: Rc<RefCell<PageLog>>,
        live_guards: Rc<Cell<usize>>,
        pending_denial: Rc<RefCell<Option<Denial>>>,
    }

    impl FakePage {
        fn with_title(title: &str) -> FakePage {
            let page = FakePage::default();
            {
                let mut log = page.log.borrow_mut();
                log.title = title.to_string();
                log.fullscreen_supported = true;
            }
            page
        }

        /// Settle an outstanding fullscreen request the way a browser
        /// without user activation does: after the call has returned.
        fn reject_pending_fullscreen(&self) {
            let denial = self.pending_denial.borrow_mut().take();
            if let Some(denial) = denial {
                denial(self);
            }
        }
    }

    struct FakeGuard {
        live: Rc<Cell<usize>>,
    }

    impl Drop for FakeGuard {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl PageHost for FakePage {
        type CursorGuard = FakeGuard;

        fn title(&self) -> String {
            self.log.borrow().title.clone()
        }

        fn set_title(&self, title: &str) {
            self.log.borrow_mut().title = title.to_string();
        }

        fn add_marker(&self) {
            self.log.borrow_mut().marker = true;
        }

        fn remove_marker(&self) {
            self.log.borrow_mut().marker = false;
        }

        fn is_fullscreen(&self) -> bool {
            self.log.borrow().fullscreen
        }

        fn request_fullscreen<F>(&self, on_denied: F) -> Result<(), ZenError>
        where
            F: FnOnce(&Self) + 'static,
        {
            let mut log = self.log.borrow_mut();
            log.fullscreen_requests += 1;
            if !log.fullscreen_supported {
                return Err(ZenError::Fullscreen("no fullscreen API".to_string()));
            }
            if log.fullscreen_denied {
                *self.pending_denial.borrow_mut() = Some(Box::new(on_denied));
            } else {
                log.fullscreen = true;
            }
            Ok(())
        }

        fn exit_fullscreen(&self) -> Result<(), ZenError> {
            self.log.borrow_mut().fullscreen = false;
            Ok(())
        }

        fn start_cursor_hiding(&self) -> FakeGuard {
            self.log.borrow_mut().guards_started += 1;
            self.live_guards.set(self.live_guards.get() + 1);
            FakeGuard {
                live: self.live_guards.clone(),
            }
        }

        fn persist_zen_mode(&self, on: bool) {
            self.log.borrow_mut().persisted.push(on);
        }

        fn notify(&self, message: &str) {
            self.log.borrow_mut().notifications.push(message.to_string());
        }
    }

    fn prefs(enable_fullscreen: bool) -> Preferences {
        Preferences { enable_fullscreen }
    }

    #[test]
    fn test_new_agent_is_inactive() {
        let page = FakePage::with_title("Excalidraw");
        let agent = PageAgent::new(page.clone());

        assert_eq!(agent.state(), ZenState::Inactive);
        assert_eq!(agent.original_title(), "Excalidraw");
        assert!(page.log.borrow().notifications.is_empty());
    }

    #[test]
    fn test_enable_applies_all_effects() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(true));

        let log = page.log.borrow();
        assert!(agent.is_active());
        assert!(log.marker);
        assert!(log.fullscreen);
        assert_eq!(log.title, "🧘 Zen Mode - Excalidraw");
        assert_eq!(page.live_guards.get(), 1);
        assert_eq!(log.persisted, vec![true]);
        assert_eq!(log.notifications, vec![ENABLED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_keyboard_trigger_requests_fullscreen() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(true));

        assert_eq!(page.log.borrow().fullscreen_requests, 1);
    }

    #[test]
    fn test_pointer_trigger_substitutes_hint() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Pointer, prefs(true));

        let log = page.log.borrow();
        assert_eq!(log.fullscreen_requests, 0);
        assert!(!log.fullscreen);
        assert_eq!(log.notifications, vec![FULLSCREEN_HINT_MESSAGE.to_string()]);
    }

    #[test]
    fn test_fullscreen_preference_off() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(false));

        let log = page.log.borrow();
        assert_eq!(log.fullscreen_requests, 0);
        assert_eq!(log.notifications, vec![ENABLED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_fullscreen_rejection_falls_back_to_hint() {
        let page = FakePage::with_title("Excalidraw");
        page.log.borrow_mut().fullscreen_supported = false;
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(true));

        let log = page.log.borrow();
        assert!(agent.is_active());
        assert_eq!(log.fullscreen_requests, 1);
        assert_eq!(log.notifications, vec![FULLSCREEN_HINT_MESSAGE.to_string()]);
    }

    #[test]
    fn test_late_fullscreen_denial_shows_hint() {
        let page = FakePage::with_title("Excalidraw");
        page.log.borrow_mut().fullscreen_denied = true;
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(true));
        assert_eq!(page.log.borrow().notifications, vec![ENABLED_MESSAGE.to_string()]);

        page.reject_pending_fullscreen();

        let log = page.log.borrow();
        assert!(agent.is_active());
        assert!(!log.fullscreen);
        assert_eq!(log.fullscreen_requests, 1);
        assert_eq!(
            log.notifications.last().map(String::as_str),
            Some(FULLSCREEN_HINT_MESSAGE)
        );
    }

    #[test]
    fn test_toggle_round_trip_restores_title() {
        let page = FakePage::with_title("My Drawing | Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        assert!(agent.toggle(Trigger::Keyboard, prefs(true)));
        assert!(!agent.toggle(Trigger::Keyboard, prefs(true)));

        let log = page.log.borrow();
        assert_eq!(agent.state(), ZenState::Inactive);
        assert_eq!(log.title, "My Drawing | Excalidraw");
        assert!(!log.marker);
        assert!(!log.fullscreen);
        assert_eq!(log.persisted, vec![true, false]);
        assert_eq!(log.notifications.last().map(String::as_str), Some(DISABLED_MESSAGE));
    }

    #[test]
    fn test_disable_releases_cursor_guard() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Pointer, prefs(true));
        assert_eq!(page.live_guards.get(), 1);

        agent.disable();
        assert_eq!(page.live_guards.get(), 0);
    }

    #[test]
    fn test_repeated_enable_holds_one_guard() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Pointer, prefs(true));
        agent.enable(Trigger::Pointer, prefs(true));
        agent.enable(Trigger::Pointer, prefs(true));

        assert!(agent.is_active());
        assert_eq!(page.log.borrow().guards_started, 3);
        assert_eq!(page.live_guards.get(), 1);
        assert_eq!(page.log.borrow().title, "🧘 Zen Mode - Excalidraw");
    }

    #[test]
    fn test_repeated_toggles_leak_nothing() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        for _ in 0..5 {
            agent.toggle(Trigger::Pointer, prefs(true));
            agent.toggle(Trigger::Pointer, prefs(true));
        }

        assert_eq!(page.log.borrow().guards_started, 5);
        assert_eq!(page.live_guards.get(), 0);
    }

    #[test]
    fn test_disable_is_idempotent() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.disable();
        agent.disable();

        let log = page.log.borrow();
        assert_eq!(agent.state(), ZenState::Inactive);
        assert_eq!(log.title, "Excalidraw");
        assert_eq!(log.persisted, vec![false, false]);
    }

    #[test]
    fn test_disable_only_exits_when_fullscreen() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.enable(Trigger::Keyboard, prefs(true));
        page.log.borrow_mut().fullscreen = false; // user pressed Esc
        agent.disable();

        assert!(!page.log.borrow().fullscreen);
    }

    #[test]
    fn test_restore_applies_visual_state_without_fullscreen() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.restore(true, prefs(true));

        let log = page.log.borrow();
        assert!(agent.is_active());
        assert!(log.marker);
        assert_eq!(log.fullscreen_requests, 0);
        assert_eq!(page.live_guards.get(), 1);
    }

    #[test]
    fn test_restore_inactive_does_nothing() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        agent.restore(false, prefs(true));

        assert!(!agent.is_active());
        assert!(page.log.borrow().persisted.is_empty());
    }

    #[test]
    fn test_respond_to_queries() {
        let page = FakePage::with_title("Excalidraw");
        let mut agent = PageAgent::new(page.clone());

        assert_eq!(agent.respond(&Request::Ping), Some(Reply::pong()));
        assert_eq!(agent.respond(&Request::GetZenState), Some(Reply::zen_state(false)));

        agent.enable(Trigger::Pointer, prefs(true));
        assert_eq!(agent.respond(&Request::GetZenState), Some(Reply::zen_state(true)));
        assert_eq!(agent.respond(&Request::Ping), Some(Reply::pong()));
        assert!(agent.is_active());

        let update = Request::UpdateCustomDomains { domains: Vec::new() };
        assert_eq!(agent.respond(&update), None);
    }

    #[test]
    fn test_toggle_shortcut() {
        assert!(is_toggle_shortcut("Z", true, false, true));
        assert!(is_toggle_shortcut("Z", false, true, true));
        assert!(!is_toggle_shortcut("Z", true, false, false));
        assert!(!is_toggle_shortcut("z", false, false, true));
        assert!(!is_toggle_shortcut("Y", true, false, true));
    }
}
