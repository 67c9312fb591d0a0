/// Fullscreen capability lookup across vendor-prefixed APIs

/// Method on the page root that enters fullscreen
pub const REQUEST_METHODS: [&str; 4] = [
    "requestFullscreen",
    "webkitRequestFullscreen",
    "mozRequestFullScreen",
    "msRequestFullscreen",
];

/// Method on the document that leaves fullscreen
pub const EXIT_METHODS: [&str; 4] = [
    "exitFullscreen",
    "webkitExitFullscreen",
    "mozCancelFullScreen",
    "msExitFullscreen",
];

/// Document property holding the current fullscreen element
pub const ELEMENT_PROPERTIES: [&str; 4] = [
    "fullscreenElement",
    "webkitFullscreenElement",
    "mozFullScreenElement",
    "msFullscreenElement",
];

/// First candidate the environment supports, in preference order
pub fn first_supported(
    candidates: &[&'static str],
    is_supported: impl Fn(&str) -> bool,
) -> Option<&'static str> {
    candidates.iter().copied().find(|name| is_supported(name))
}
