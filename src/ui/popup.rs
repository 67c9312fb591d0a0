/// Popup UI for the Excali-Zen extension

use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::controller::{Controller, ExtensionApi, PopupView};
use crate::web::bridge::{BrowserStorage, WebExtension};

/// How long the popup lingers after a successful toggle
const CLOSE_DELAY_MS: i32 = 500;

#[derive(Clone, PartialEq)]
enum AppState {
    Checking,
    Busy,
    Ready(PopupView),
}

fn controller() -> Controller<WebExtension, BrowserStorage> {
    Controller::new(WebExtension, BrowserStorage)
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Checking);

    // Ask the page agent for its state on open
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let view = controller().popup_status().await;
                state.set(AppState::Ready(view));
            });
            || ()
        });
    }

    let on_toggle = {
        let state = state.clone();

        Callback::from(move |_| {
            let state = state.clone();
            state.set(AppState::Busy);

            spawn_local(async move {
                let view = controller().popup_toggle().await;
                let toggled = !matches!(view, PopupView::Unavailable(_));
                state.set(AppState::Ready(view));
                if toggled {
                    close_popup_later();
                }
            });
        })
    };

    let on_options = Callback::from(|e: MouseEvent| {
        e.prevent_default();
        WebExtension.open_options_page();
        if let Some(window) = web_sys::window() {
            let _ = window.close();
        }
    });

    let (status_class, status_text, icon, label, disabled) = match &*state {
        AppState::Checking => ("status", "Checking...".to_string(), "🧘", "Enter Zen Mode", true),
        AppState::Busy => ("status", "Working...".to_string(), "🧘", "Enter Zen Mode", true),
        AppState::Ready(PopupView::Active) => (
            "status active",
            "🧘 Zen Mode Active".to_string(),
            "🌅",
            "Exit Zen Mode",
            false,
        ),
        AppState::Ready(PopupView::Inactive) => (
            "status inactive",
            "Ready to Focus".to_string(),
            "🧘",
            "Enter Zen Mode",
            false,
        ),
        AppState::Ready(PopupView::Unavailable(reason)) => {
            ("status error", reason.clone(), "⚠️", "Unavailable", true)
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Excali-Zen"}</h1>

            <div class={status_class}>
                if matches!(*state, AppState::Checking | AppState::Busy) {
                    <Spinner />
                }
                <span class="status-text">{status_text}</span>
            </div>

            <Button onclick={on_toggle} disabled={disabled} variant={ButtonVariant::Primary} block={true}>
                <span class="button-icon">{icon}</span>
                <span class="button-text">{label}</span>
            </Button>

            <p class="footer-popup">
                <a href="#" onclick={on_options}>{"Options"}</a>
            </p>
        </div>
    }
}

fn close_popup_later() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let close = {
        let window = window.clone();
        Closure::once_into_js(move || {
            let _ = window.close();
        })
    };
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(close.unchecked_ref(), CLOSE_DELAY_MS)
    {
        log::warn!("Could not schedule popup close: {:?}", e);
    }
}
