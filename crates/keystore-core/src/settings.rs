//! Network settings and relay defaults
//!
//! Settings live in a plain JSON file next to the keystore cache. Four
//! relay-related fields are always normalized on the way in; every other field
//! is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::network::default_relays;

const PREFERRED_RELAYS: &str = "preferredRelays";
const CUSTOM_BOOTSTRAP_NODES: &str = "customBootstrapNodes";
const ENABLE_AUTORELAY: &str = "enableAutorelay";
const ENABLE_AUTONAT: &str = "enableAutonat";

/// Fill in relay defaults on a loosely-typed settings value.
///
/// Non-objects are returned unchanged.
pub fn ensure_relay_defaults(mut settings: Value) -> Value {
    ensure_relay_defaults_in_place(&mut settings);
    settings
}

/// In-place form of [`ensure_relay_defaults`]
pub fn ensure_relay_defaults_in_place(settings: &mut Value) {
    let Some(target) = settings.as_object_mut() else {
        return;
    };

    // Each list gets its own copy of the defaults
    for field in [PREFERRED_RELAYS, CUSTOM_BOOTSTRAP_NODES] {
        let has_entries = matches!(target.get(field), Some(Value::Array(list)) if !list.is_empty());
        if !has_entries {
            let relays = default_relays().into_iter().map(Value::String).collect();
            target.insert(field.to_string(), Value::Array(relays));
        }
    }

    // Only a literal `true` survives
    for field in [ENABLE_AUTORELAY, ENABLE_AUTONAT] {
        if target.get(field) != Some(&Value::Bool(true)) {
            target.insert(field.to_string(), Value::Bool(true));
        }
    }
}

/// Network settings as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    /// Relays to reserve a slot on, in preference order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_relays: Option<Vec<String>>,
    /// Bootstrap peers dialed at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_bootstrap_nodes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_autorelay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_autonat: Option<bool>,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Relay configuration with every field resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub preferred_relays: Vec<String>,
    pub custom_bootstrap_nodes: Vec<String>,
    pub enable_autorelay: bool,
    pub enable_autonat: bool,
}

fn non_empty_or_default(list: Option<Vec<String>>) -> Vec<String> {
    match list {
        Some(list) if !list.is_empty() => list,
        _ => default_relays(),
    }
}

impl NetworkSettings {
    /// Parse settings from loosely-typed JSON, applying relay defaults first
    /// so that missing or mistyped relay fields are accepted.
    ///
    /// Non-string entries in the relay lists are dropped rather than failing
    /// the whole parse; a list left empty falls back to the defaults.
    pub fn from_value(mut value: Value) -> Result<Self> {
        if let Some(target) = value.as_object_mut() {
            for field in [PREFERRED_RELAYS, CUSTOM_BOOTSTRAP_NODES] {
                if let Some(Value::Array(list)) = target.get_mut(field) {
                    list.retain(Value::is_string);
                }
            }
        }

        Ok(serde_json::from_value(ensure_relay_defaults(value))?)
    }

    /// Return these settings with all four relay fields populated
    pub fn with_relay_defaults(self) -> Self {
        Self {
            preferred_relays: Some(non_empty_or_default(self.preferred_relays)),
            custom_bootstrap_nodes: Some(non_empty_or_default(self.custom_bootstrap_nodes)),
            enable_autorelay: Some(true),
            enable_autonat: Some(true),
            extra: self.extra,
        }
    }

    /// Get the effective relay configuration
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            preferred_relays: non_empty_or_default(self.preferred_relays.clone()),
            custom_bootstrap_nodes: non_empty_or_default(self.custom_bootstrap_nodes.clone()),
            enable_autorelay: true,
            enable_autonat: true,
        }
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: NetworkSettings,
}

impl SettingsManager {
    /// Create a settings manager for `settings.json` in `storage_dir`
    pub fn new(storage_dir: &Path) -> Self {
        Self::with_file(storage_dir.join("settings.json"))
    }

    /// Create a settings manager for an explicit settings file
    pub fn with_file(settings_file: PathBuf) -> Self {
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings {:?}: {}", settings_file, e);
            NetworkSettings::default().with_relay_defaults()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<NetworkSettings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(NetworkSettings::default().with_relay_defaults());
        }

        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        let settings = NetworkSettings::from_value(value)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &NetworkSettings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut NetworkSettings {
        &mut self.settings
    }

    /// Replace settings, re-apply relay defaults and save
    pub async fn update(&mut self, settings: NetworkSettings) -> Result<()> {
        self.settings = settings.with_relay_defaults();
        self.save().await
    }

    /// Get the effective relay configuration
    pub fn relay_config(&self) -> RelayConfig {
        self.settings.relay_config()
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = NetworkSettings::default().with_relay_defaults();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file).await?;
        }

        Ok(())
    }

    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::DEFAULT_RELAY_LIST;
    use serde_json::json;
    use tempfile::TempDir;

    fn default_list_value() -> Value {
        json!(DEFAULT_RELAY_LIST)
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let settings = ensure_relay_defaults(json!({}));

        assert_eq!(settings[PREFERRED_RELAYS], default_list_value());
        assert_eq!(settings[CUSTOM_BOOTSTRAP_NODES], default_list_value());
        assert_eq!(settings[ENABLE_AUTORELAY], json!(true));
        assert_eq!(settings[ENABLE_AUTONAT], json!(true));
    }

    #[test]
    fn test_empty_and_mistyped_lists_are_replaced() {
        let settings = ensure_relay_defaults(json!({
            "preferredRelays": [],
            "customBootstrapNodes": "/ip4/1.2.3.4/tcp/4001",
        }));

        assert_eq!(settings[PREFERRED_RELAYS], default_list_value());
        assert_eq!(settings[CUSTOM_BOOTSTRAP_NODES], default_list_value());
    }

    #[test]
    fn test_configured_lists_are_kept() {
        let settings = ensure_relay_defaults(json!({
            "preferredRelays": ["/ip4/1.2.3.4/tcp/4001"],
            "customBootstrapNodes": ["/ip4/5.6.7.8/tcp/4001"],
        }));

        assert_eq!(settings[PREFERRED_RELAYS], json!(["/ip4/1.2.3.4/tcp/4001"]));
        assert_eq!(settings[CUSTOM_BOOTSTRAP_NODES], json!(["/ip4/5.6.7.8/tcp/4001"]));
    }

    #[test]
    fn test_only_literal_true_is_left_alone() {
        for value in [json!(false), json!("true"), json!(1), json!(null), json!({})] {
            let settings = ensure_relay_defaults(json!({
                "enableAutorelay": value.clone(),
                "enableAutonat": value,
            }));

            assert_eq!(settings[ENABLE_AUTORELAY], json!(true));
            assert_eq!(settings[ENABLE_AUTONAT], json!(true));
        }

        let settings = ensure_relay_defaults(json!({
            "enableAutorelay": true,
            "enableAutonat": true,
        }));
        assert_eq!(settings[ENABLE_AUTORELAY], json!(true));
        assert_eq!(settings[ENABLE_AUTONAT], json!(true));
    }

    #[test]
    fn test_default_lists_are_independent() {
        let mut settings = ensure_relay_defaults(json!({}));

        settings[PREFERRED_RELAYS]
            .as_array_mut()
            .unwrap()
            .push(json!("/ip4/9.9.9.9/tcp/4001"));

        assert_eq!(settings[CUSTOM_BOOTSTRAP_NODES], default_list_value());
        assert_eq!(
            settings[PREFERRED_RELAYS].as_array().unwrap().len(),
            DEFAULT_RELAY_LIST.len() + 1
        );
    }

    #[test]
    fn test_non_objects_pass_through() {
        for value in [json!(null), json!("settings"), json!(42), json!(false), json!([1, 2])] {
            assert_eq!(ensure_relay_defaults(value.clone()), value);
        }
    }

    #[test]
    fn test_other_fields_preserved() {
        let settings = ensure_relay_defaults(json!({ "theme": "dark", "port": 4001 }));

        assert_eq!(settings["theme"], json!("dark"));
        assert_eq!(settings["port"], json!(4001));
    }

    #[test]
    fn test_typed_with_relay_defaults() {
        let settings = NetworkSettings {
            preferred_relays: Some(vec![]),
            enable_autorelay: Some(false),
            ..Default::default()
        }
        .with_relay_defaults();

        assert_eq!(settings.preferred_relays, Some(default_relays()));
        assert_eq!(settings.custom_bootstrap_nodes, Some(default_relays()));
        assert_eq!(settings.enable_autorelay, Some(true));
        assert_eq!(settings.enable_autonat, Some(true));
    }

    #[test]
    fn test_from_value_accepts_mistyped_fields() {
        let settings = NetworkSettings::from_value(json!({
            "preferredRelays": ["/ip4/1.2.3.4/tcp/4001"],
            "enableAutorelay": "yes",
            "enableAutonat": 0,
            "theme": "dark",
        }))
        .unwrap();

        assert_eq!(
            settings.preferred_relays,
            Some(vec!["/ip4/1.2.3.4/tcp/4001".to_string()])
        );
        assert_eq!(settings.enable_autorelay, Some(true));
        assert_eq!(settings.enable_autonat, Some(true));
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(NetworkSettings::from_value(json!("nope")).is_err());
    }

    #[test]
    fn test_relay_config() {
        let settings = NetworkSettings {
            custom_bootstrap_nodes: Some(vec!["/ip4/5.6.7.8/tcp/4001".to_string()]),
            ..Default::default()
        };

        let config = settings.relay_config();
        assert_eq!(config.preferred_relays, default_relays());
        assert_eq!(config.custom_bootstrap_nodes, vec!["/ip4/5.6.7.8/tcp/4001"]);
        assert!(config.enable_autorelay);
        assert!(config.enable_autonat);
    }

    #[tokio::test]
    async fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path());

        assert_eq!(manager.get().preferred_relays, Some(default_relays()));
        assert_eq!(manager.get().enable_autonat, Some(true));
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::new(temp_dir.path());
            manager.get_mut().preferred_relays = Some(vec!["/ip4/1.2.3.4/tcp/4001".to_string()]);
            manager
                .get_mut()
                .extra
                .insert("theme".to_string(), json!("dark"));
            manager.save().await.unwrap();
        }

        {
            let manager = SettingsManager::new(temp_dir.path());
            assert_eq!(
                manager.get().preferred_relays,
                Some(vec!["/ip4/1.2.3.4/tcp/4001".to_string()])
            );
            assert_eq!(manager.get().custom_bootstrap_nodes, Some(default_relays()));
            assert_eq!(manager.get().extra.get("theme"), Some(&json!("dark")));
        }
    }

    #[tokio::test]
    async fn test_file_with_disabled_relay_is_normalized() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"enableAutorelay": false, "preferredRelays": []}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path());

        assert_eq!(manager.get().enable_autorelay, Some(true));
        assert_eq!(manager.get().preferred_relays, Some(default_relays()));
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{not json").unwrap();

        let manager = SettingsManager::new(temp_dir.path());

        assert_eq!(manager.get(), &NetworkSettings::default().with_relay_defaults());
    }

    #[tokio::test]
    async fn test_mistyped_list_entry_keeps_other_fields() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"theme": "dark", "preferredRelays": [42], "customBootstrapNodes": [7, "/ip4/5.6.7.8/tcp/4001"]}"#,
        )
        .unwrap();

        {
            let manager = SettingsManager::new(temp_dir.path());
            assert_eq!(manager.get().extra.get("theme"), Some(&json!("dark")));
            assert_eq!(manager.get().preferred_relays, Some(default_relays()));
            assert_eq!(
                manager.get().custom_bootstrap_nodes,
                Some(vec!["/ip4/5.6.7.8/tcp/4001".to_string()])
            );
            manager.save().await.unwrap();
        }

        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("settings.json")).unwrap())
                .unwrap();
        assert_eq!(saved["theme"], json!("dark"));
    }

    #[tokio::test]
    async fn test_update_and_reset() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path());

        manager
            .update(NetworkSettings {
                enable_autonat: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(manager.get().enable_autonat, Some(true));
        assert!(manager.settings_file().exists());

        manager.reset().await.unwrap();
        assert!(!manager.settings_file().exists());
        assert_eq!(manager.get(), &NetworkSettings::default().with_relay_defaults());
    }
}
