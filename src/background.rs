/// Background page: wires browser events to the controller

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::controller::{Controller, TabRef};
use crate::protocol::Request;
use crate::web::bridge::{
    BrowserStorage, WebExtension, from_js, get_tab, onActionClicked, onCommand, onInstalled,
    onRuntimeMessage, onTabActivated, onTabRemoved, onTabUpdated, to_js,
};

type BackgroundController = Rc<Controller<WebExtension, BrowserStorage>>;

pub fn start() {
    let controller: BackgroundController = Rc::new(Controller::new(WebExtension, BrowserStorage));

    listen_for_clicks(controller.clone());
    listen_for_tabs(controller.clone());
    listen_for_commands(controller.clone());
    listen_for_messages(controller.clone());
    listen_for_install(controller);

    log::info!("Background controller ready");
}

fn listen_for_clicks(controller: BackgroundController) {
    let handler = Closure::wrap(Box::new(move |tab: JsValue| {
        let tab: TabRef = match from_js(tab) {
            Ok(tab) => tab,
            Err(e) => {
                log::error!("Unreadable tab in click event: {}", e);
                return;
            }
        };
        let controller = controller.clone();
        spawn_local(async move {
            controller.on_action_clicked(tab).await;
        });
    }) as Box<dyn FnMut(JsValue)>);

    onActionClicked(handler.as_ref().unchecked_ref());
    handler.forget();
}

fn listen_for_tabs(controller: BackgroundController) {
    let updated = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |tab: JsValue, status: String| {
            let Ok(tab) = from_js::<TabRef>(tab) else {
                return;
            };
            let controller = controller.clone();
            spawn_local(async move {
                controller.on_tab_updated(tab, &status).await;
            });
        }) as Box<dyn FnMut(JsValue, String)>)
    };

    let activated = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |tab_id: i32| {
            let controller = controller.clone();
            spawn_local(async move {
                match get_tab(tab_id).await {
                    Ok(tab) => controller.on_tab_activated(tab).await,
                    Err(e) => log::debug!("Activated tab {} vanished: {}", tab_id, e),
                }
            });
        }) as Box<dyn FnMut(i32)>)
    };

    let removed = Closure::wrap(Box::new(move |tab_id: i32| {
        controller.on_tab_removed(tab_id);
    }) as Box<dyn FnMut(i32)>);

    onTabUpdated(updated.as_ref().unchecked_ref());
    onTabActivated(activated.as_ref().unchecked_ref());
    onTabRemoved(removed.as_ref().unchecked_ref());
    updated.forget();
    activated.forget();
    removed.forget();
}

fn listen_for_commands(controller: BackgroundController) {
    let handler = Closure::wrap(Box::new(move |command: String| {
        let controller = controller.clone();
        spawn_local(async move {
            controller.on_command(&command).await;
        });
    }) as Box<dyn FnMut(String)>);

    onCommand(handler.as_ref().unchecked_ref());
    handler.forget();
}

fn listen_for_messages(controller: BackgroundController) {
    let handler = Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
        let Ok(request) = from_js::<Request>(message) else {
            return JsValue::UNDEFINED;
        };
        controller
            .on_message(request)
            .and_then(|reply| to_js(&reply).ok())
            .unwrap_or(JsValue::UNDEFINED)
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    onRuntimeMessage(handler.as_ref().unchecked_ref());
    handler.forget();
}

fn listen_for_install(controller: BackgroundController) {
    let handler = Closure::wrap(Box::new(move |reason: String| {
        controller.on_installed(&reason);
    }) as Box<dyn FnMut(String)>);

    onInstalled(handler.as_ref().unchecked_ref());
    handler.forget();
}
