/// Controller: routes toolbar, command, tab and popup triggers to the page agent
use std::cell::RefCell;
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Eligibility, classify};
use crate::error::ZenError;
use crate::protocol::{PingReply, Reply, Request, ZenStateReply};
use crate::settings::{SettingsStore, load_or_default};

pub type TabId = i32;

/// Keyboard command registered for toggling
pub const TOGGLE_COMMAND: &str = "toggle-zen-mode";

/// Assets injected into custom-domain pages, stylesheet first
pub const AGENT_STYLESHEET: &str = "zen-mode.css";
pub const AGENT_SCRIPT: &str = "content.js";

pub const NOTIFICATION_TITLE: &str = "Excali-Zen";
const UNSUPPORTED_MESSAGE: &str =
    "This extension only works on Excalidraw domains. Add custom domains in the options page.";
const WELCOME_TITLE: &str = "Excali-Zen Installed!";
const WELCOME_MESSAGE: &str =
    "Visit Excalidraw.com and click the extension icon to enter zen mode. Add custom domains in options!";

const POPUP_NO_TAB: &str = "Unable to access current tab";
const POPUP_UNSUPPORTED: &str =
    "This extension only works on Excalidraw domains. Add custom domains in options.";
const POPUP_UNREACHABLE: &str = "Unable to connect to Excalidraw";
const POPUP_TOGGLE_FAILED: &str = "Failed to toggle zen mode";

const ICON_SIZES: [u32; 4] = [16, 32, 48, 128];

/// The controller's view of a browser tab
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabRef {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
}

/// Toolbar icon and tooltip for one tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarPresentation {
    pub zen_mode: bool,
}

impl ToolbarPresentation {
    pub fn title(&self) -> &'static str {
        if self.zen_mode {
            "Exit Zen Mode"
        } else {
            "Enter Zen Mode"
        }
    }

    /// `(size, path)` pairs for `setIcon`
    pub fn icon_paths(&self) -> Vec<(u32, String)> {
        let stem = if self.zen_mode { "icon-zen" } else { "icon" };
        ICON_SIZES
            .iter()
            .map(|size| (*size, format!("icons/{}-{}.png", stem, size)))
            .collect()
    }
}

/// What the popup shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupView {
    Active,
    Inactive,
    Unavailable(String),
}

impl PopupView {
    fn from_state(zen_mode: bool) -> PopupView {
        if zen_mode {
            PopupView::Active
        } else {
            PopupView::Inactive
        }
    }

    fn unavailable(reason: &str) -> PopupView {
        PopupView::Unavailable(reason.to_string())
    }
}

/// Browser APIs the controller drives
#[allow(async_fn_in_trait)]
pub trait ExtensionApi {
    async fn active_tab(&self) -> Result<Option<TabRef>, ZenError>;
    /// Deliver `request` to the tab's agent and return its raw reply
    async fn send_to_tab(&self, tab: TabId, request: &Request) -> Result<Value, ZenError>;
    async fn insert_css(&self, tab: TabId, file: &str) -> Result<(), ZenError>;
    async fn execute_script(&self, tab: TabId, file: &str) -> Result<(), ZenError>;
    fn set_toolbar(&self, tab: TabId, presentation: ToolbarPresentation);
    fn notify(&self, title: &str, message: &str);
    fn open_options_page(&self);
}

/// Per-tab trigger tickets. A reply only updates the toolbar while its
/// ticket is still the newest one issued for that tab.
#[derive(Debug, Default)]
pub struct TriggerLedger {
    next: u64,
    latest: HashMap<TabId, u64>,
}

impl TriggerLedger {
    pub fn issue(&mut self, tab: TabId) -> u64 {
        self.next += 1;
        self.latest.insert(tab, self.next);
        self.next
    }

    pub fn is_current(&self, tab: TabId, ticket: u64) -> bool {
        self.latest.get(&tab) == Some(&ticket)
    }

    pub fn forget(&mut self, tab: TabId) {
        self.latest.remove(&tab);
    }
}

pub struct Controller<E, S> {
    api: E,
    store: S,
    ledger: RefCell<TriggerLedger>,
}

impl<E: ExtensionApi, S: SettingsStore> Controller<E, S> {
    pub fn new(api: E, store: S) -> Controller<E, S> {
        Controller {
            api,
            store,
            ledger: RefCell::new(TriggerLedger::default()),
        }
    }

    /// Toolbar icon clicked
    pub async fn on_action_clicked(&self, tab: TabRef) {
        self.toggle_tab(tab, false).await;
    }

    /// Keyboard command fired
    pub async fn on_command(&self, command: &str) {
        if command != TOGGLE_COMMAND {
            log::debug!("Ignoring unknown command '{}'", command);
            return;
        }

        match self.api.active_tab().await {
            Ok(Some(tab)) => self.toggle_tab(tab, true).await,
            Ok(None) => log::warn!("Toggle command fired without an active tab"),
            Err(e) => log::error!("Error resolving active tab: {}", e),
        }
    }

    /// Tab finished (re)loading
    pub async fn on_tab_updated(&self, tab: TabRef, status: &str) {
        if status != "complete" || tab.url.is_none() {
            return;
        }
        self.refresh(tab).await;
    }

    /// User switched to another tab
    pub async fn on_tab_activated(&self, tab: TabRef) {
        self.refresh(tab).await;
    }

    pub fn on_tab_removed(&self, tab: TabId) {
        self.ledger.borrow_mut().forget(tab);
    }

    /// Runtime messages addressed to the controller
    pub fn on_message(&self, request: Request) -> Option<Reply> {
        match request {
            Request::UpdateCustomDomains { domains } => {
                log::info!("Custom domains updated: {:?}", domains);
                Some(Reply::ack())
            }
            _ => None,
        }
    }

    pub fn on_installed(&self, reason: &str) {
        if reason == "install" {
            self.api.notify(WELCOME_TITLE, WELCOME_MESSAGE);
            self.api.open_options_page();
        }
    }

    /// State shown when the popup opens
    pub async fn popup_status(&self) -> PopupView {
        let tab = match self.popup_target().await {
            Ok(tab) => tab,
            Err(view) => return view,
        };

        match self.query_state(tab.id).await {
            Ok(zen_mode) => PopupView::from_state(zen_mode),
            Err(e) => {
                log::error!("Error getting zen state: {}", e);
                PopupView::unavailable(POPUP_UNREACHABLE)
            }
        }
    }

    /// Popup button clicked
    pub async fn popup_toggle(&self) -> PopupView {
        let tab = match self.popup_target().await {
            Ok(tab) => tab,
            Err(view) => return view,
        };

        let ticket = self.ledger.borrow_mut().issue(tab.id);
        match self.toggle_state(tab.id, false).await {
            Ok(zen_mode) => {
                self.present(tab.id, ticket, zen_mode);
                PopupView::from_state(zen_mode)
            }
            Err(e) => {
                log::error!("Error toggling zen mode: {}", e);
                PopupView::unavailable(POPUP_TOGGLE_FAILED)
            }
        }
    }

    /// Probe for an agent and inject one if nobody answers
    pub async fn ensure_agent(&self, tab: TabId) -> Result<(), ZenError> {
        if self.probe(tab).await {
            return Ok(());
        }

        self.api.insert_css(tab, AGENT_STYLESHEET).await?;
        self.api.execute_script(tab, AGENT_SCRIPT).await?;
        log::info!("Content script injected into tab {}", tab);
        Ok(())
    }

    async fn probe(&self, tab: TabId) -> bool {
        match self.api.send_to_tab(tab, &Request::Ping).await {
            Ok(reply) => serde_json::from_value::<PingReply>(reply)
                .map(|pong| pong.injected)
                .unwrap_or(false),
            Err(e) => {
                log::debug!("No agent in tab {}: {}", tab, e);
                false
            }
        }
    }

    async fn eligibility(&self, url: Option<&str>) -> Eligibility {
        let settings = load_or_default(&self.store).await;
        classify(url, settings.custom_domains.as_slice())
    }

    /// Classify the tab and make sure an agent is listening in it
    async fn prepare(&self, tab: &TabRef) -> Result<Eligibility, ZenError> {
        let eligibility = self.eligibility(tab.url.as_deref()).await;
        if eligibility == Eligibility::Custom {
            self.ensure_agent(tab.id).await?;
        }
        Ok(eligibility)
    }

    async fn toggle_tab(&self, tab: TabRef, from_keyboard: bool) {
        let ticket = self.ledger.borrow_mut().issue(tab.id);

        match self.prepare(&tab).await {
            Ok(Eligibility::Ineligible) => {
                self.api.notify(NOTIFICATION_TITLE, UNSUPPORTED_MESSAGE);
                return;
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("Error injecting content script: {}", e);
                return;
            }
        }

        match self.toggle_state(tab.id, from_keyboard).await {
            Ok(zen_mode) => self.present(tab.id, ticket, zen_mode),
            Err(e) => log::error!("Error toggling zen mode: {}", e),
        }
    }

    async fn refresh(&self, tab: TabRef) {
        let ticket = self.ledger.borrow_mut().issue(tab.id);

        match self.prepare(&tab).await {
            Ok(Eligibility::Ineligible) => return,
            Ok(_) => {}
            Err(e) => {
                log::warn!("Could not reach agent in tab {}: {}", tab.id, e);
                self.present(tab.id, ticket, false);
                return;
            }
        }

        let zen_mode = match self.query_state(tab.id).await {
            Ok(zen_mode) => zen_mode,
            Err(e) => {
                log::debug!("Agent not ready in tab {}: {}", tab.id, e);
                false
            }
        };
        self.present(tab.id, ticket, zen_mode);
    }

    async fn popup_target(&self) -> Result<TabRef, PopupView> {
        let tab = match self.api.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => return Err(PopupView::unavailable(POPUP_NO_TAB)),
            Err(e) => {
                log::error!("Error resolving active tab: {}", e);
                return Err(PopupView::unavailable(POPUP_NO_TAB));
            }
        };

        match self.prepare(&tab).await {
            Ok(Eligibility::Ineligible) => Err(PopupView::unavailable(POPUP_UNSUPPORTED)),
            Ok(_) => Ok(tab),
            Err(e) => {
                log::error!("Error injecting content script: {}", e);
                Err(PopupView::unavailable(POPUP_UNREACHABLE))
            }
        }
    }

    async fn query_state(&self, tab: TabId) -> Result<bool, ZenError> {
        self.request_state(tab, &Request::GetZenState).await
    }

    async fn toggle_state(&self, tab: TabId, from_keyboard: bool) -> Result<bool, ZenError> {
        self.request_state(tab, &Request::ToggleZenMode { from_keyboard }).await
    }

    async fn request_state(&self, tab: TabId, request: &Request) -> Result<bool, ZenError> {
        let reply = self.api.send_to_tab(tab, request).await?;
        let state: ZenStateReply =
            serde_json::from_value(reply).map_err(|e| ZenError::Decode(e.to_string()))?;
        Ok(state.zen_mode)
    }

    fn present(&self, tab: TabId, ticket: u64, zen_mode: bool) {
        if self.ledger.borrow().is_current(tab, ticket) {
            self.api.set_toolbar(tab, ToolbarPresentation { zen_mode });
        } else {
            log::debug!("Dropping stale reply for tab {}", tab);
        }
    }
}
