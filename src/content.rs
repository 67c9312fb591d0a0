/// Content script: hosts the page agent inside an eligible page

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{KeyboardEvent, Window};

use crate::agent::{PageAgent, Trigger, is_toggle_shortcut};
use crate::error::ZenError;
use crate::protocol::{Reply, Request};
use crate::settings::load_or_default;
use crate::web::bridge::{BrowserStorage, onRuntimeMessage, to_js};
use crate::web::page::DomPage;

/// Set on the window once an agent runs in this page
const AGENT_FLAG: &str = "__excaliZenAgent";

type SharedAgent = Rc<RefCell<PageAgent<DomPage>>>;

pub fn start() {
    let Some(window) = web_sys::window() else {
        log::error!("Content script loaded without a window");
        return;
    };

    if claim_page(&window) {
        spawn_local(async move {
            if let Err(e) = run(window).await {
                log::error!("Page agent failed to start: {}", e);
            }
        });
    } else {
        log::debug!("Page agent already running");
    }
}

/// Mark this page as owned by an agent. False if another load got there first.
fn claim_page(window: &Window) -> bool {
    let flag = JsValue::from_str(AGENT_FLAG);
    if Reflect::has(window, &flag).unwrap_or(false) {
        return false;
    }
    Reflect::set(window, &flag, &JsValue::TRUE).unwrap_or(false)
}

async fn run(window: Window) -> Result<(), ZenError> {
    let page = DomPage::new(window.clone())?;
    let agent: SharedAgent = Rc::new(RefCell::new(PageAgent::new(page)));

    listen_for_requests(agent.clone());
    listen_for_shortcut(&window, agent.clone())?;

    let settings = load_or_default(&BrowserStorage).await;
    agent
        .borrow_mut()
        .restore(settings.zen_mode, settings.preferences());

    log::info!("Page agent ready");
    Ok(())
}

/// Toggle with a preference read fresh from storage
async fn toggle(agent: &SharedAgent, trigger: Trigger) -> bool {
    let prefs = load_or_default(&BrowserStorage).await.preferences();
    agent.borrow_mut().toggle(trigger, prefs)
}

fn listen_for_requests(agent: SharedAgent) {
    let handler = Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
        let request: Request = match serde_wasm_bindgen::from_value(message) {
            Ok(request) => request,
            Err(_) => return JsValue::UNDEFINED,
        };

        match request {
            Request::ToggleZenMode { from_keyboard } => {
                let agent = agent.clone();
                future_to_promise(async move {
                    let zen_mode = toggle(&agent, Trigger::from_keyboard(from_keyboard)).await;
                    to_js(&Reply::zen_state(zen_mode)).map_err(|e| JsValue::from_str(&e.to_string()))
                })
                .into()
            }
            other => agent
                .borrow()
                .respond(&other)
                .and_then(|reply| to_js(&reply).ok())
                .unwrap_or(JsValue::UNDEFINED),
        }
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    onRuntimeMessage(handler.as_ref().unchecked_ref());
    handler.forget();
}

fn listen_for_shortcut(window: &Window, agent: SharedAgent) -> Result<(), ZenError> {
    let document = window
        .document()
        .ok_or_else(|| ZenError::Dom("window has no document".to_string()))?;

    let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if !is_toggle_shortcut(&event.key(), event.ctrl_key(), event.meta_key(), event.shift_key()) {
            return;
        }
        event.prevent_default();

        let agent = agent.clone();
        spawn_local(async move {
            toggle(&agent, Trigger::Keyboard).await;
        });
    }) as Box<dyn FnMut(KeyboardEvent)>);

    document
        .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
        .map_err(|e| ZenError::from_js(ZenError::Dom, e))?;
    on_key.forget();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_second_claim_is_refused() {
        let window = web_sys::window().unwrap();
        Reflect::delete_property(&window, &JsValue::from_str(AGENT_FLAG)).unwrap();

        assert!(claim_page(&window));
        assert!(!claim_page(&window));
        assert!(!claim_page(&window));
    }
}
