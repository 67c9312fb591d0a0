/// Error types shared by the agent, controller and UI
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZenError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("no page agent answered: {0}")]
    Messaging(String),
    #[error("failed to inject page agent: {0}")]
    Injection(String),
    #[error("fullscreen unavailable: {0}")]
    Fullscreen(String),
    #[error("unexpected reply shape: {0}")]
    Decode(String),
    #[error("page DOM call failed: {0}")]
    Dom(String),
}

impl ZenError {
    /// Wrap a thrown JS value, keeping its debug rendering for the log
    pub fn from_js(kind: fn(String) -> ZenError, value: JsValue) -> ZenError {
        kind(format!("{:?}", value))
    }
}

/// Reasons the options page refuses a custom domain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Please enter a domain URL")]
    Empty,
    #[error("Please enter a valid URL (e.g., https://draw.example.com)")]
    Invalid,
    #[error("Domain already exists")]
    Duplicate,
    #[error("excalidraw.com is already supported by default")]
    Primary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_messages() {
        assert_eq!(DomainError::Empty.to_string(), "Please enter a domain URL");
        assert_eq!(DomainError::Duplicate.to_string(), "Domain already exists");
        assert_eq!(
            DomainError::Primary.to_string(),
            "excalidraw.com is already supported by default"
        );
    }

    #[test]
    fn test_zen_error_display() {
        let err = ZenError::Messaging("Could not establish connection".to_string());
        assert_eq!(
            err.to_string(),
            "no page agent answered: Could not establish connection"
        );
    }
}
