/// Persisted extension settings and the storage seam

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::validate_custom_domain;
use crate::error::{DomainError, ZenError};

pub const CUSTOM_DOMAINS_KEY: &str = "customDomains";
pub const ZEN_MODE_KEY: &str = "zenMode";
pub const ENABLE_FULLSCREEN_KEY: &str = "enableFullscreen";

/// Every key this extension reads
pub const ALL_KEYS: [&str; 3] = [CUSTOM_DOMAINS_KEY, ZEN_MODE_KEY, ENABLE_FULLSCREEN_KEY];

/// Snapshot of the persisted state, defaults filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub custom_domains: CustomDomains,
    pub zen_mode: bool,
    pub enable_fullscreen: bool,
}

impl Settings {
    /// Decode whatever storage returned. Each key falls back to its default
    /// on its own, so one bad value never hides the others.
    pub fn from_stored(stored: &Value) -> Settings {
        let defaults = Settings::default();
        Settings {
            custom_domains: decode_key(stored, CUSTOM_DOMAINS_KEY).unwrap_or(defaults.custom_domains),
            zen_mode: decode_key(stored, ZEN_MODE_KEY).unwrap_or(defaults.zen_mode),
            enable_fullscreen: decode_key(stored, ENABLE_FULLSCREEN_KEY)
                .unwrap_or(defaults.enable_fullscreen),
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            enable_fullscreen: self.enable_fullscreen,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            custom_domains: CustomDomains::default(),
            zen_mode: false,
            enable_fullscreen: true,
        }
    }
}

fn decode_key<T: DeserializeOwned>(stored: &Value, key: &str) -> Option<T> {
    let value = stored.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Ignoring malformed '{}' in storage: {}", key, e);
            None
        }
    }
}

/// User preferences read by the page agent when zen mode turns on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub enable_fullscreen: bool,
}

impl Preferences {
    pub fn should_enter_fullscreen(&self) -> bool {
        self.enable_fullscreen
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Settings::default().preferences()
    }
}

/// A single-key write. Keys are written independently, last write wins.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    CustomDomains(Vec<String>),
    ZenMode(bool),
    EnableFullscreen(bool),
}

impl SettingUpdate {
    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::CustomDomains(_) => CUSTOM_DOMAINS_KEY,
            SettingUpdate::ZenMode(_) => ZEN_MODE_KEY,
            SettingUpdate::EnableFullscreen(_) => ENABLE_FULLSCREEN_KEY,
        }
    }

    /// The `{ key: value }` object handed to `storage.local.set`
    pub fn to_items(&self) -> Value {
        let value = match self {
            SettingUpdate::CustomDomains(domains) => Value::from(domains.clone()),
            SettingUpdate::ZenMode(on) => Value::Bool(*on),
            SettingUpdate::EnableFullscreen(on) => Value::Bool(*on),
        };
        let mut items = Map::new();
        items.insert(self.key().to_string(), value);
        Value::Object(items)
    }
}

/// Persisted key-value store shared by every extension context
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn load(&self) -> Result<Settings, ZenError>;
    async fn store(&self, update: SettingUpdate) -> Result<(), ZenError>;
}

/// Load settings, substituting defaults when storage is unreadable
pub async fn load_or_default<S: SettingsStore>(store: &S) -> Settings {
    match store.load().await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Falling back to default settings: {}", e);
            Settings::default()
        }
    }
}

/// User-added eligible domains, in insertion order and without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CustomDomains(Vec<String>);

impl<'de> Deserialize<'de> for CustomDomains {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(CustomDomains::from)
    }
}

impl CustomDomains {
    pub fn new() -> Self {
        CustomDomains(Vec::new())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate and append a user-entered domain, returning the stored form
    pub fn add(&mut self, input: &str) -> Result<String, DomainError> {
        let entry = validate_custom_domain(input, &self.0)?;
        self.0.push(entry.clone());
        Ok(entry)
    }

    pub fn remove(&mut self, domain: &str) -> bool {
        let original_len = self.0.len();
        self.0.retain(|d| d != domain);
        self.0.len() < original_len
    }

    pub fn to_update(&self) -> SettingUpdate {
        SettingUpdate::CustomDomains(self.0.clone())
    }
}

impl From<Vec<String>> for CustomDomains {
    fn from(entries: Vec<String>) -> Self {
        let mut domains = CustomDomains::new();
        for entry in entries {
            if !domains.0.contains(&entry) {
                domains.0.push(entry);
            }
        }
        domains
    }
}
