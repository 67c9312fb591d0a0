/// WebExtension API access through the JS bridge module

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use crate::controller::{ExtensionApi, TabId, TabRef, ToolbarPresentation};
use crate::error::ZenError;
use crate::protocol::Request;
use crate::settings::{ALL_KEYS, SettingUpdate, Settings, SettingsStore};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn insertCss(tab_id: i32, file: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn executeScript(tab_id: i32, file: &str) -> Result<(), JsValue>;

    fn setActionIcon(tab_id: i32, path: JsValue);
    fn setActionTitle(tab_id: i32, title: &str);
    fn createNotification(title: &str, message: &str);
    fn openOptionsPage();

    pub(crate) fn onRuntimeMessage(handler: &js_sys::Function);
    pub(crate) fn onActionClicked(handler: &js_sys::Function);
    pub(crate) fn onTabUpdated(handler: &js_sys::Function);
    pub(crate) fn onTabActivated(handler: &js_sys::Function);
    pub(crate) fn onTabRemoved(handler: &js_sys::Function);
    pub(crate) fn onCommand(handler: &js_sys::Function);
    pub(crate) fn onInstalled(handler: &js_sys::Function);
}

/// Serialize into plain JS objects (not `Map`s), as the browser APIs expect
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, ZenError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ZenError::Decode(e.to_string()))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ZenError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| ZenError::Decode(e.to_string()))
}

pub async fn get_tab(tab: TabId) -> Result<TabRef, ZenError> {
    let tab = getTab(tab)
        .await
        .map_err(|e| ZenError::from_js(ZenError::Messaging, e))?;
    from_js(tab)
}

/// Message the extension's own pages (the background page, in practice)
pub async fn send_runtime_message(request: &Request) -> Result<Value, ZenError> {
    let reply = sendRuntimeMessage(to_js(request)?)
        .await
        .map_err(|e| ZenError::from_js(ZenError::Messaging, e))?;
    from_js(reply)
}

/// `browser.*` as seen from the background page or popup
#[derive(Debug, Clone, Copy, Default)]
pub struct WebExtension;

impl ExtensionApi for WebExtension {
    async fn active_tab(&self) -> Result<Option<TabRef>, ZenError> {
        let tab = queryActiveTab()
            .await
            .map_err(|e| ZenError::from_js(ZenError::Messaging, e))?;
        if tab.is_null() || tab.is_undefined() {
            return Ok(None);
        }
        from_js(tab).map(Some)
    }

    async fn send_to_tab(&self, tab: TabId, request: &Request) -> Result<Value, ZenError> {
        let reply = sendTabMessage(tab, to_js(request)?)
            .await
            .map_err(|e| ZenError::from_js(ZenError::Messaging, e))?;
        from_js(reply)
    }

    async fn insert_css(&self, tab: TabId, file: &str) -> Result<(), ZenError> {
        insertCss(tab, file)
            .await
            .map_err(|e| ZenError::from_js(ZenError::Injection, e))
    }

    async fn execute_script(&self, tab: TabId, file: &str) -> Result<(), ZenError> {
        executeScript(tab, file)
            .await
            .map_err(|e| ZenError::from_js(ZenError::Injection, e))
    }

    fn set_toolbar(&self, tab: TabId, presentation: ToolbarPresentation) {
        let paths: Map<String, Value> = presentation
            .icon_paths()
            .into_iter()
            .map(|(size, path)| (size.to_string(), Value::String(path)))
            .collect();

        match to_js(&paths) {
            Ok(paths) => setActionIcon(tab, paths),
            Err(e) => log::warn!("Could not build icon paths: {}", e),
        }
        setActionTitle(tab, presentation.title());
    }

    fn notify(&self, title: &str, message: &str) {
        createNotification(title, message);
    }

    fn open_options_page(&self) {
        openOptionsPage();
    }
}

/// `browser.storage.local`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl SettingsStore for BrowserStorage {
    async fn load(&self) -> Result<Settings, ZenError> {
        let stored = getStorage(to_js(&ALL_KEYS)?)
            .await
            .map_err(|e| ZenError::from_js(ZenError::Storage, e))?;
        let stored: Value = from_js(stored)?;
        Ok(Settings::from_stored(&stored))
    }

    async fn store(&self, update: SettingUpdate) -> Result<(), ZenError> {
        setStorage(to_js(&update.to_items())?)
            .await
            .map_err(|e| ZenError::from_js(ZenError::Storage, e))
    }
}
