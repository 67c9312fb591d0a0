/// Browser-backed implementations of the agent and controller seams
pub mod bridge;
pub mod cursor;
pub mod page;

#[cfg(all(test, target_arch = "wasm32"))]
mod test_support;
