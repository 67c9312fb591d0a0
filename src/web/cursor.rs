/// Idle cursor hiding for the page agent

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::error::ZenError;

/// Pointer idle time before the cursor disappears
pub const IDLE_DELAY_MS: i32 = 3000;

/// Hides the cursor after [`IDLE_DELAY_MS`] without pointer movement.
///
/// Movement shows the cursor and restarts the countdown. Dropping the hider
/// cancels the countdown, removes the listener and shows the cursor.
pub struct CursorHider {
    window: Window,
    document: Document,
    body: HtmlElement,
    pending: Rc<Cell<Option<i32>>>,
    on_move: Closure<dyn FnMut()>,
}

impl CursorHider {
    pub fn start(window: &Window, document: &Document) -> Result<CursorHider, ZenError> {
        CursorHider::with_delay(window, document, IDLE_DELAY_MS)
    }

    pub fn with_delay(window: &Window, document: &Document, delay_ms: i32) -> Result<CursorHider, ZenError> {
        let body = document
            .body()
            .ok_or_else(|| ZenError::Dom("document has no body".to_string()))?;
        let pending = Rc::new(Cell::new(None));

        let hide = {
            let body = body.clone();
            Rc::new(Closure::wrap(Box::new(move || {
                set_cursor(&body, "none");
            }) as Box<dyn FnMut()>))
        };

        let on_move = {
            let window = window.clone();
            let body = body.clone();
            let pending = pending.clone();
            let hide = hide.clone();
            Closure::wrap(Box::new(move || {
                set_cursor(&body, "");
                restart_countdown(&window, &pending, &hide, delay_ms);
            }) as Box<dyn FnMut()>)
        };

        document
            .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
            .map_err(|e| ZenError::from_js(ZenError::Dom, e))?;
        restart_countdown(window, &pending, &hide, delay_ms);

        Ok(CursorHider {
            window: window.clone(),
            document: document.clone(),
            body,
            pending,
            on_move,
        })
    }
}

impl Drop for CursorHider {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback("mousemove", self.on_move.as_ref().unchecked_ref())
        {
            log::warn!("Could not remove cursor listener: {:?}", e);
        }
        set_cursor(&self.body, "");
    }
}

fn restart_countdown(
    window: &Window,
    pending: &Cell<Option<i32>>,
    hide: &Closure<dyn FnMut()>,
    delay_ms: i32,
) {
    if let Some(handle) = pending.take() {
        window.clear_timeout_with_handle(handle);
    }
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        hide.as_ref().unchecked_ref(),
        delay_ms,
    ) {
        Ok(handle) => pending.set(Some(handle)),
        Err(e) => log::warn!("Could not schedule cursor hiding: {:?}", e),
    }
}

fn set_cursor(body: &HtmlElement, value: &str) {
    let style = body.style();
    let result = if value.is_empty() {
        style.remove_property("cursor").map(|_| ())
    } else {
        style.set_property("cursor", value)
    };
    if let Err(e) = result {
        log::debug!("Could not set cursor style: {:?}", e);
    }
}
