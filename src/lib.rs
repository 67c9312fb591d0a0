/// Excali-Zen - zen mode for Excalidraw pages
/// Built with Rust + WASM + Yew

pub mod agent;
mod background;
mod content;
pub mod controller;
pub mod domain;
pub mod error;
pub mod fullscreen;
pub mod protocol;
pub mod settings;
pub mod ui;
pub mod web;

use wasm_bindgen::prelude::*;

// Set up panic hook and logging in every extension context
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Background page: toolbar, commands, tab events
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}

// Content script: the page agent
#[wasm_bindgen]
pub fn start_content() {
    content::start();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}
