//! Translation catalog and locale preference.
//!
//! The device serves its own `lang.json` next to the dashboard pages; we
//! fetch it once at startup and fall back to the copy embedded at build
//! time when the device is unreachable. The chosen language persists
//! across sessions in a small prefs file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Built-in fallback copy of the device's translation file.
const EMBEDDED_CATALOG: &str = include_str!("../assets/lang.json");

/// The language every lookup falls back to.
pub const FALLBACK_LANG: &str = "zh";

/// `lang -> key -> text`. Keys ending in `_placeholder` carry the
/// placeholder variant of their base key.
#[derive(Debug, Clone)]
pub struct Catalog {
    languages: HashMap<String, HashMap<String, String>>,
    current: String,
}

impl Catalog {
    pub fn from_str(raw: &str) -> Result<Self> {
        let languages: HashMap<String, HashMap<String, String>> =
            serde_json::from_str(raw).context("parsing translation catalog")?;
        Ok(Self {
            languages,
            current: FALLBACK_LANG.to_string(),
        })
    }

    /// The copy compiled into the binary.
    pub fn embedded() -> Self {
        // The embedded asset is validated by tests; failing to parse it
        // is a build defect, not a runtime condition.
        Self::from_str(EMBEDDED_CATALOG).expect("embedded lang.json")
    }

    /// Fetches the catalog from the device, e.g. `http://host/lang.json`.
    pub async fn fetch(url: &Url) -> Result<Self> {
        debug!(%url, "fetching translation catalog");
        let raw = reqwest::get(url.as_str())
            .await
            .context("requesting lang.json")?
            .error_for_status()?
            .text()
            .await?;
        Self::from_str(&raw)
    }

    pub fn current_language(&self) -> &str {
        &self.current
    }

    /// Switches the active language. Unknown codes are kept; lookups then
    /// resolve through the fallback chain.
    pub fn set_language(&mut self, lang: &str) {
        self.current = lang.to_string();
    }

    pub fn has_language(&self, lang: &str) -> bool {
        self.languages.contains_key(lang)
    }

    /// Looks `key` up in the active language, then the fallback language,
    /// then yields the key itself so a missing entry stays visible.
    pub fn tr(&self, key: &str) -> String {
        self.lookup(&self.current, key)
            .or_else(|| self.lookup(FALLBACK_LANG, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.replace('_', " "))
    }

    /// Placeholder variant of `key`, if the catalog carries one.
    pub fn placeholder(&self, key: &str) -> Option<String> {
        let ph = format!("{key}_placeholder");
        self.lookup(&self.current, &ph)
            .or_else(|| self.lookup(FALLBACK_LANG, &ph))
            .map(str::to_string)
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.languages.get(lang)?.get(key).map(String::as_str)
    }
}

/// Persisted user preferences. Only the locale survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefs {
    pub lang: String,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            lang: FALLBACK_LANG.to_string(),
        }
    }
}

impl Prefs {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "prefs file unreadable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing prefs to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses_and_has_both_languages() {
        let catalog = Catalog::embedded();
        assert!(catalog.has_language("zh"));
        assert!(catalog.has_language("fr"));
    }

    #[test]
    fn lookup_falls_back_to_default_language_then_key() {
        let mut catalog = Catalog::from_str(
            r#"{
                "zh": { "ws_connected": "已连接", "only_zh": "中文" },
                "fr": { "ws_connected": "Connecté" }
            }"#,
        )
        .unwrap();

        catalog.set_language("fr");
        assert_eq!(catalog.tr("ws_connected"), "Connecté");
        assert_eq!(catalog.tr("only_zh"), "中文");
        assert_eq!(catalog.tr("missing_key"), "missing key");
    }

    #[test]
    fn placeholder_variant_resolves() {
        let catalog = Catalog::from_str(
            r#"{ "zh": { "wifi_password": "密码", "wifi_password_placeholder": "输入密码" } }"#,
        )
        .unwrap();
        assert_eq!(catalog.placeholder("wifi_password").as_deref(), Some("输入密码"));
        assert_eq!(catalog.placeholder("wifi_ssid"), None);
    }

    #[test]
    fn prefs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = Prefs { lang: "fr".into() };
        prefs.save(&path).unwrap();

        let loaded = Prefs::load(&path);
        assert_eq!(loaded.lang, "fr");
    }

    #[test]
    fn missing_prefs_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Prefs::load(&dir.path().join("nope.json"));
        assert_eq!(prefs.lang, FALLBACK_LANG);
    }
}
