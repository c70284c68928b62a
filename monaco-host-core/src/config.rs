use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::readiness::ReadinessPolicy;

/// Backoff settings for the readiness probe, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReadinessSettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        ReadinessSettings {
            max_attempts: 15,
            initial_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl ReadinessSettings {
    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Bridge settings, persisted to `<config dir>/monaco-host/bridge.json`.
///
/// `#[serde(default)]` keeps older files loadable when fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BridgeConfig {
    // ── Handshake ────────────────────────────────────────────────────────
    pub readiness: ReadinessSettings,
    /// Fixed pause after navigation completes, before the first probe.
    pub settle_delay_ms: u64,

    // ── Page ─────────────────────────────────────────────────────────────
    /// Base URL of the Monaco `vs` directory used by the AMD loader.
    pub monaco_base_url: String,
    pub default_language: String,
    pub default_theme: String,
    /// Name of the webview script message handler events are posted to.
    pub message_handler: String,

    // ── Overlay ──────────────────────────────────────────────────────────
    pub loading_message: String,
    pub diff_loading_message: String,
    pub initializing_message: String,
    pub failure_message: String,

    // ── Content ──────────────────────────────────────────────────────────
    /// Decode single-line content that looks base64-wrapped before sending.
    pub detect_base64_content: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            readiness: ReadinessSettings::default(),
            settle_delay_ms: 500,

            monaco_base_url: String::from(
                "https://cdn.jsdelivr.net/npm/monaco-editor@0.44.0/min/vs",
            ),
            default_language: String::from("javascript"),
            default_theme: String::from("vs-dark"),
            message_handler: String::from("monacoHost"),

            loading_message: String::from("Loading Monaco Editor..."),
            diff_loading_message: String::from("Loading Monaco Diff Editor..."),
            initializing_message: String::from("Initializing editor..."),
            failure_message: String::from("Failed to load editor"),

            detect_base64_content: false,
        }
    }
}

impl BridgeConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        self.readiness.policy()
    }

    /// JSON schema of the config file, for editor tooling.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(BridgeConfig)).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<BridgeConfig, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("monaco-host").join("bridge.json"))
}

/// Load the user config, falling back to defaults when it is missing or broken.
pub fn load() -> BridgeConfig {
    let Some(path) = config_path() else {
        return BridgeConfig::default();
    };
    if !path.is_file() {
        return BridgeConfig::default();
    }
    match BridgeConfig::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}; using default bridge config", e);
            BridgeConfig::default()
        }
    }
}

pub fn save(config: &BridgeConfig) -> Result<(), String> {
    let path = config_path().ok_or_else(|| "Cannot determine config directory".to_string())?;
    config.save_to(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_handshake_constants() {
        let config = BridgeConfig::default();
        let policy = config.readiness_policy();
        assert_eq!(policy, ReadinessPolicy::default());
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.default_theme, "vs-dark");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"readiness": {"max_attempts": 3}, "default_theme": "vs"}"#)
                .unwrap();
        assert_eq!(config.readiness.max_attempts, 3);
        assert_eq!(config.readiness.initial_delay_ms, 100);
        assert_eq!(config.default_theme, "vs");
        assert_eq!(config.default_language, "javascript");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bridge.json");
        let config = BridgeConfig {
            settle_delay_ms: 50,
            detect_base64_content: true,
            ..BridgeConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(BridgeConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = BridgeConfig::load_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse"));
    }

    #[test]
    fn default_config_validates_against_schema() {
        let schema = BridgeConfig::json_schema();
        let compiled = jsonschema::JSONSchema::compile(&schema).unwrap();
        let instance = serde_json::to_value(BridgeConfig::default()).unwrap();
        assert!(compiled.is_valid(&instance));

        let bad = serde_json::json!({ "settle_delay_ms": "soon" });
        assert!(!compiled.is_valid(&bad));
    }
}
