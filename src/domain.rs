/// Domain matching: which pages get zen mode
use url::Url;

use crate::error::DomainError;

/// The always-eligible site. Matched by substring, never stored.
pub const PRIMARY_DOMAIN: &str = "excalidraw.com";

/// How the primary domain is listed on the options page
pub const PRIMARY_DOMAIN_URL: &str = "https://excalidraw.com";

/// Why a URL is (or is not) a zen mode target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The primary domain; its agent is declared statically and never injected.
    Primary,
    /// A user-registered domain; the agent may need injecting.
    Custom,
    Ineligible,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        !matches!(self, Eligibility::Ineligible)
    }
}

/// Substring check against the primary domain.
///
/// Looser than the custom-domain match on purpose: any URL mentioning
/// `excalidraw.com` anywhere qualifies.
pub fn is_primary(url: &str) -> bool {
    url.contains(PRIMARY_DOMAIN)
}

/// Decide whether `url` is an eligible page
pub fn is_eligible(url: Option<&str>, custom_domains: &[String]) -> bool {
    classify(url, custom_domains).is_eligible()
}

/// Classify `url` against the primary domain and the user's custom domains.
///
/// Custom entries match only when scheme, host and port all agree. Entries or
/// URLs that fail to parse never match.
pub fn classify(url: Option<&str>, custom_domains: &[String]) -> Eligibility {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => return Eligibility::Ineligible,
    };

    if is_primary(url) {
        return Eligibility::Primary;
    }

    let Some(target) = Origin::parse(url) else {
        return Eligibility::Ineligible;
    };

    if custom_domains
        .iter()
        .filter_map(|domain| Origin::parse(domain))
        .any(|origin| origin == target)
    {
        Eligibility::Custom
    } else {
        Eligibility::Ineligible
    }
}

/// Validate a user-entered custom domain.
///
/// Returns the trimmed entry ready to store. Only http and https are accepted.
pub fn validate_custom_domain(input: &str, existing: &[String]) -> Result<String, DomainError> {
    let entry = input.trim();
    if entry.is_empty() {
        return Err(DomainError::Empty);
    }

    let parsed = Url::parse(entry).map_err(|_| DomainError::Invalid)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DomainError::Invalid);
    }

    if existing.iter().any(|domain| domain == entry) {
        return Err(DomainError::Duplicate);
    }

    if is_primary(entry) {
        return Err(DomainError::Primary);
    }

    Ok(entry.to_string())
}

/// The fields a custom domain is compared on
#[derive(Debug, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    // Default ports normalize to None, like the browser's `URL.port`.
    port: Option<u16>,
}

impl Origin {
    fn parse(raw: &str) -> Option<Origin> {
        let url = Url::parse(raw).ok()?;
        Some(Origin {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_primary_domain_always_eligible() {
        assert!(is_eligible(Some("https://excalidraw.com/abc"), &[]));
        assert!(is_eligible(Some("https://excalidraw.com"), &domains(&["not a url"])));
        assert_eq!(
            classify(Some("https://excalidraw.com/#room=1"), &[]),
            Eligibility::Primary
        );
    }

    #[test]
    fn test_primary_domain_is_a_substring_match() {
        // Subdomains, other schemes and even query strings qualify.
        assert!(is_eligible(Some("https://plus.excalidraw.com"), &[]));
        assert!(is_eligible(Some("http://excalidraw.com:8080/"), &[]));
        assert!(is_eligible(Some("https://example.org/?ref=excalidraw.com"), &[]));
    }

    #[test]
    fn test_empty_or_missing_url() {
        let custom = domains(&["https://draw.example.com"]);
        assert!(!is_eligible(None, &custom));
        assert!(!is_eligible(Some(""), &custom));
    }

    #[test]
    fn test_custom_domain_exact_match() {
        let custom = domains(&["https://draw.example.com"]);
        assert_eq!(
            classify(Some("https://draw.example.com/board/42"), &custom),
            Eligibility::Custom
        );
    }

    #[test]
    fn test_custom_domain_port_mismatch() {
        let custom = domains(&["https://draw.example.com"]);
        assert!(!is_eligible(Some("https://draw.example.com:8443/x"), &custom));
    }

    #[test]
    fn test_custom_domain_scheme_mismatch() {
        let custom = domains(&["https://draw.example.com"]);
        assert!(!is_eligible(Some("http://draw.example.com/"), &custom));
    }

    #[test]
    fn test_custom_domain_host_mismatch() {
        let custom = domains(&["https://draw.example.com"]);
        assert!(!is_eligible(Some("https://other.example.com/"), &custom));
        assert!(!is_eligible(Some("https://sub.draw.example.com/"), &custom));
    }

    #[test]
    fn test_custom_domain_explicit_port() {
        let custom = domains(&["http://localhost:3000"]);
        assert!(is_eligible(Some("http://localhost:3000/"), &custom));
        assert!(!is_eligible(Some("http://localhost:3001/"), &custom));
        assert!(!is_eligible(Some("http://localhost/"), &custom));
    }

    #[test]
    fn test_default_port_normalizes() {
        let custom = domains(&["https://draw.example.com:443"]);
        assert!(is_eligible(Some("https://draw.example.com/"), &custom));
    }

    #[test]
    fn test_malformed_entries_never_match() {
        let custom = domains(&["::::", "", "draw.example.com", "https://draw.example.com"]);
        assert!(is_eligible(Some("https://draw.example.com/"), &custom));
        assert!(!is_eligible(Some("not a url"), &custom));
    }

    #[test]
    fn test_validate_custom_domain() {
        let existing = domains(&["https://draw.example.com"]);

        assert_eq!(
            validate_custom_domain("  https://team.example.org  ", &existing),
            Ok("https://team.example.org".to_string())
        );
        assert_eq!(validate_custom_domain("   ", &existing), Err(DomainError::Empty));
        assert_eq!(validate_custom_domain("draw", &existing), Err(DomainError::Invalid));
        assert_eq!(
            validate_custom_domain("ftp://files.example.com", &existing),
            Err(DomainError::Invalid)
        );
        assert_eq!(
            validate_custom_domain("https://draw.example.com", &existing),
            Err(DomainError::Duplicate)
        );
        assert_eq!(
            validate_custom_domain("https://excalidraw.com", &existing),
            Err(DomainError::Primary)
        );
    }
}
