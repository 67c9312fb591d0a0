use js_sys::Promise;
use wasm_bindgen_futures::JsFuture;

/// Resolve after `ms` milliseconds of browser time
pub async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _| {
        web_sys::window()
            .expect("test runs in a window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("timer should schedule");
    });
    JsFuture::from(promise).await.expect("timer promise never rejects");
}
