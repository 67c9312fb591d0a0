/// The live page: DOM side of the page agent

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Window};

use crate::agent::{MARKER_CLASS, PageHost};
use crate::error::ZenError;
use crate::fullscreen::{ELEMENT_PROPERTIES, EXIT_METHODS, REQUEST_METHODS, first_supported};
use crate::settings::{SettingUpdate, SettingsStore};
use crate::web::bridge::BrowserStorage;
use crate::web::cursor::CursorHider;

const NOTIFICATION_CLASS: &str = "excali-zen-notification";
const NOTIFICATION_LIFETIME_MS: i32 = 2000;

#[derive(Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new(window: Window) -> Result<DomPage, ZenError> {
        let document = window
            .document()
            .ok_or_else(|| ZenError::Dom("window has no document".to_string()))?;
        Ok(DomPage { window, document })
    }

    fn root(&self) -> Result<JsValue, ZenError> {
        self.document
            .document_element()
            .map(JsValue::from)
            .ok_or_else(|| ZenError::Dom("document has no root element".to_string()))
    }

    fn toggle_marker(&self, on: bool) {
        let Some(body) = self.document.body() else {
            log::warn!("Page has no body to mark");
            return;
        };
        let classes = body.class_list();
        let result = if on {
            classes.add_1(MARKER_CLASS)
        } else {
            classes.remove_1(MARKER_CLASS)
        };
        if let Err(e) = result {
            log::warn!("Could not update zen marker: {:?}", e);
        }
    }

    fn show_notification(&self, message: &str) -> Result<(), JsValue> {
        if let Some(existing) = self.document.query_selector(&format!(".{}", NOTIFICATION_CLASS))? {
            existing.remove();
        }

        let Some(body) = self.document.body() else {
            return Ok(());
        };

        let notification = self.document.create_element("div")?;
        notification.set_class_name(NOTIFICATION_CLASS);
        notification.set_text_content(Some(message));
        body.append_child(&notification)?;

        let remove = Closure::once_into_js(move || notification.remove());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.unchecked_ref(),
                NOTIFICATION_LIFETIME_MS,
            )?;
        Ok(())
    }
}

/// Look up `name` on `target` and return it if callable
fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Call the first supported vendor variant of a fullscreen method. The
/// standard API answers with a promise that settles later; it is handed back.
fn call_first(target: &JsValue, candidates: &[&'static str]) -> Result<Option<Promise>, ZenError> {
    let name = first_supported(candidates, |name| method(target, name).is_some())
        .ok_or_else(|| ZenError::Fullscreen("not supported by this browser".to_string()))?;
    let function = method(target, name)
        .ok_or_else(|| ZenError::Fullscreen(format!("{} disappeared", name)))?;

    let result = function
        .call0(target)
        .map_err(|e| ZenError::from_js(ZenError::Fullscreen, e))?;
    Ok(result.dyn_into::<Promise>().ok())
}

impl PageHost for DomPage {
    type CursorGuard = Option<CursorHider>;

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn add_marker(&self) {
        self.toggle_marker(true);
    }

    fn remove_marker(&self) {
        self.toggle_marker(false);
    }

    fn is_fullscreen(&self) -> bool {
        let document = JsValue::from(self.document.clone());
        first_supported(&ELEMENT_PROPERTIES, |name| {
            Reflect::has(&document, &JsValue::from_str(name)).unwrap_or(false)
        })
        .and_then(|name| Reflect::get(&document, &JsValue::from_str(name)).ok())
        .is_some_and(|element| !element.is_null() && !element.is_undefined())
    }

    fn request_fullscreen<F>(&self, on_denied: F) -> Result<(), ZenError>
    where
        F: FnOnce(&Self) + 'static,
    {
        // Without user activation the promise rejects after this returns.
        let Some(promise) = call_first(&self.root()?, &REQUEST_METHODS)? else {
            return Ok(());
        };
        let page = self.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Fullscreen request rejected: {:?}", e);
                on_denied(&page);
            }
        });
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<(), ZenError> {
        let Some(promise) = call_first(&JsValue::from(self.document.clone()), &EXIT_METHODS)? else {
            return Ok(());
        };
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Exit fullscreen rejected: {:?}", e);
            }
        });
        Ok(())
    }

    fn start_cursor_hiding(&self) -> Option<CursorHider> {
        match CursorHider::start(&self.window, &self.document) {
            Ok(hider) => Some(hider),
            Err(e) => {
                log::warn!("Cursor hiding unavailable: {}", e);
                None
            }
        }
    }

    fn persist_zen_mode(&self, on: bool) {
        spawn_local(async move {
            if let Err(e) = BrowserStorage.store(SettingUpdate::ZenMode(on)).await {
                log::warn!("Could not save zen state: {}", e);
            }
        });
    }

    fn notify(&self, message: &str) {
        if let Err(e) = self.show_notification(message) {
            log::warn!("Could not show notification: {:?}", e);
        }
    }
}
