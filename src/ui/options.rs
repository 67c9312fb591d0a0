/// Options page: custom domains and the fullscreen preference

use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::domain::PRIMARY_DOMAIN_URL;
use crate::error::ZenError;
use crate::protocol::Request;
use crate::settings::{CustomDomains, SettingUpdate, SettingsStore};
use crate::ui::components::{DomainRow, StatusBanner, StatusKind, StatusMessage};
use crate::web::bridge::{BrowserStorage, send_runtime_message};

/// Success messages clear themselves after this long
const STATUS_LIFETIME_MS: i32 = 5000;

const ADDED_MESSAGE: &str =
    "Domain added successfully! Reload any open tabs with this domain to activate zen mode.";

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let domains = use_state(CustomDomains::new);
    let input_value = use_state(String::new);
    let enable_fullscreen = use_state(|| true);
    let status = use_state(|| None::<StatusMessage>);

    // Load settings on mount
    {
        let domains = domains.clone();
        let enable_fullscreen = enable_fullscreen.clone();
        let status = status.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match BrowserStorage.load().await {
                    Ok(settings) => {
                        enable_fullscreen.set(settings.enable_fullscreen);
                        domains.set(settings.custom_domains);
                    }
                    Err(e) => {
                        log::error!("Error loading domains: {}", e);
                        show_status(&status, StatusMessage::error("Error loading domains"));
                    }
                }
            });
            || ()
        });
    }

    let on_input = {
        let input_value = input_value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                input_value.set(input.value());
            }
        })
    };

    let on_add = {
        let domains = domains.clone();
        let input_value = input_value.clone();
        let status = status.clone();

        Callback::from(move |_: ()| {
            let domains = domains.clone();
            let input_value = input_value.clone();
            let status = status.clone();

            spawn_local(async move {
                // Re-read so another options tab's edits are not lost
                let mut current = match BrowserStorage.load().await {
                    Ok(settings) => settings.custom_domains,
                    Err(_) => (*domains).clone(),
                };

                if let Err(e) = current.add(&input_value) {
                    show_status(&status, StatusMessage::error(e.to_string()));
                    return;
                }

                match save_domains(&current).await {
                    Ok(()) => {
                        domains.set(current);
                        input_value.set(String::new());
                        show_status(&status, StatusMessage::success(ADDED_MESSAGE));
                    }
                    Err(e) => {
                        log::error!("Error adding domain: {}", e);
                        show_status(&status, StatusMessage::error("Error adding domain"));
                    }
                }
            });
        })
    };

    let on_add_click = {
        let on_add = on_add.clone();
        Callback::from(move |_: MouseEvent| on_add.emit(()))
    };

    let on_keypress = {
        let on_add = on_add.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_add.emit(());
            }
        })
    };

    let on_remove = {
        let domains = domains.clone();
        let status = status.clone();

        Callback::from(move |domain: String| {
            if !confirm_removal(&domain) {
                return;
            }

            let domains = domains.clone();
            let status = status.clone();

            spawn_local(async move {
                let mut current = match BrowserStorage.load().await {
                    Ok(settings) => settings.custom_domains,
                    Err(_) => (*domains).clone(),
                };
                current.remove(&domain);

                match save_domains(&current).await {
                    Ok(()) => {
                        domains.set(current);
                        show_status(&status, StatusMessage::success("Domain removed successfully"));
                    }
                    Err(e) => {
                        log::error!("Error removing domain: {}", e);
                        show_status(&status, StatusMessage::error("Error removing domain"));
                    }
                }
            });
        })
    };

    let on_fullscreen_change = {
        let enable_fullscreen = enable_fullscreen.clone();
        let status = status.clone();

        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let checked = input.checked();
            enable_fullscreen.set(checked);

            let status = status.clone();
            spawn_local(async move {
                match BrowserStorage.store(SettingUpdate::EnableFullscreen(checked)).await {
                    Ok(()) => show_status(&status, StatusMessage::success("Settings saved successfully!")),
                    Err(e) => {
                        log::error!("Error saving fullscreen setting: {}", e);
                        show_status(&status, StatusMessage::error("Error saving settings"));
                    }
                }
            });
        })
    };

    html! {
        <div class="padding-20">
            <h1 class="options-title">{"Excali-Zen Options"}</h1>

            <StatusBanner status={(*status).clone()} />

            <section class="options-section">
                <h2>{"Fullscreen"}</h2>
                <label class="checkbox-label">
                    <input
                        type="checkbox"
                        checked={*enable_fullscreen}
                        onchange={on_fullscreen_change}
                    />
                    {" Enter fullscreen when zen mode is toggled with the keyboard shortcut"}
                </label>
            </section>

            <section class="options-section">
                <h2>{"Custom Domains"}</h2>
                <div class="flex-row-gap">
                    <input
                        class="domain-input"
                        type="url"
                        placeholder="https://draw.example.com"
                        value={(*input_value).clone()}
                        oninput={on_input}
                        onkeypress={on_keypress}
                    />
                    <Button onclick={on_add_click} variant={ButtonVariant::Primary}>
                        {"Add Domain"}
                    </Button>
                </div>

                <div class="domain-list">
                    <DomainRow url={PRIMARY_DOMAIN_URL.to_string()} is_default={true} />
                    {for domains.as_slice().iter().map(|domain| html! {
                        <DomainRow
                            key={domain.clone()}
                            url={domain.clone()}
                            on_remove={on_remove.clone()}
                        />
                    })}
                    if domains.is_empty() {
                        <div class="empty-state">
                            {"No custom domains added yet. Add your self-hosted Excalidraw domains above."}
                        </div>
                    }
                </div>
            </section>
        </div>
    }
}

/// Persist the list and tell the background page about it
async fn save_domains(domains: &CustomDomains) -> Result<(), ZenError> {
    BrowserStorage.store(domains.to_update()).await?;

    let notice = Request::UpdateCustomDomains {
        domains: domains.as_slice().to_vec(),
    };
    // The background page may still be starting up; storage is the source of truth.
    if let Err(e) = send_runtime_message(&notice).await {
        log::info!("Could not notify background script: {}", e);
    }
    Ok(())
}

fn confirm_removal(domain: &str) -> bool {
    web_sys::window()
        .and_then(|window| {
            window
                .confirm_with_message(&format!("Remove {} from custom domains?", domain))
                .ok()
        })
        .unwrap_or(false)
}

fn show_status(status: &UseStateHandle<Option<StatusMessage>>, message: StatusMessage) {
    let auto_hide = message.kind == StatusKind::Success;
    status.set(Some(message));

    if !auto_hide {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let clear = {
        let status = status.clone();
        Closure::once_into_js(move || status.set(None))
    };
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(clear.unchecked_ref(), STATUS_LIFETIME_MS)
    {
        log::warn!("Could not schedule status clear: {:?}", e);
    }
}
