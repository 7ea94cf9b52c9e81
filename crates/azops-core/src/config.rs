use crate::confirm::Impact;
use crate::error::{AzopsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_account: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_resource_manager")]
    pub resource_manager: String,
    /// Data-plane URL template; `{vault}` is replaced with the vault name.
    #[serde(default = "default_key_vault")]
    pub key_vault: String,
}

fn default_resource_manager() -> String {
    "https://management.azure.com".to_string()
}

fn default_key_vault() -> String {
    "https://{vault}.vault.azure.net".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            resource_manager: default_resource_manager(),
            key_vault: default_key_vault(),
        }
    }
}

impl EndpointsConfig {
    pub fn vault_url(&self, vault_name: &str) -> String {
        self.key_vault
            .replace("{vault}", vault_name)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn resource_manager_url(&self) -> &str {
        self.resource_manager.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// ApiVersions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVersions {
    #[serde(default = "default_key_vault_api")]
    pub key_vault: String,
    #[serde(default = "default_automation_api")]
    pub automation: String,
}

fn default_key_vault_api() -> String {
    "7.4".to_string()
}

fn default_automation_api() -> String {
    "2023-11-01".to_string()
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            key_vault: default_key_vault_api(),
            automation: default_automation_api(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding a pre-acquired bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_token_env() -> String {
    "AZOPS_ACCESS_TOKEN".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
        }
    }
}

impl AuthConfig {
    pub fn token(&self) -> Result<String> {
        match std::env::var(&self.token_env) {
            Ok(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => Err(AzopsError::MissingToken(self.token_env.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfirmConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConfig {
    /// Actions at or above this impact prompt unless forced.
    #[serde(default = "default_threshold")]
    pub threshold: Impact,
}

fn default_threshold() -> Impact {
    Impact::High
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub api_versions: ApiVersions,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub confirm: ConfirmConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            subscription_id: None,
            defaults: DefaultsConfig::default(),
            endpoints: EndpointsConfig::default(),
            api_versions: ApiVersions::default(),
            auth: AuthConfig::default(),
            confirm: ConfirmConfig::default(),
        }
    }
}

impl Config {
    pub fn load(home: &Path) -> Result<Self> {
        let path = paths::config_path(home);
        if !path.exists() {
            return Err(AzopsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(home: &Path) -> Result<Self> {
        match Self::load(home) {
            Err(AzopsError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let path = paths::config_path(home);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config if none exists. Returns true if written.
    pub fn init(home: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(home), data.as_bytes())
    }

    pub fn subscription(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.subscription_id.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or(AzopsError::MissingSubscription)
    }

    pub fn resource_group(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.defaults.resource_group.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or(AzopsError::MissingResourceGroup)
    }

    pub fn automation_account(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.defaults.automation_account.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or(AzopsError::MissingAutomationAccount)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(sub) = &self.subscription_id {
            if uuid::Uuid::parse_str(sub).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("subscription_id '{sub}' is not a UUID"),
                });
            }
        }

        if !self.endpoints.key_vault.contains("{vault}") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "endpoints.key_vault '{}' has no {{vault}} placeholder",
                    self.endpoints.key_vault
                ),
            });
        }

        for (key, url) in [
            ("resource_manager", &self.endpoints.resource_manager),
            ("key_vault", &self.endpoints.key_vault),
        ] {
            if !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("endpoints.{key} '{url}' is not https"),
                });
            }
        }

        if self.auth.token_env.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.token_env is empty".to_string(),
            });
        }

        if self.confirm.threshold == Impact::Low {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "confirm.threshold is low: every mutating command will prompt"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.endpoints.resource_manager, "https://management.azure.com");
        assert_eq!(cfg.api_versions.key_vault, "7.4");
        assert_eq!(cfg.auth.token_env, "AZOPS_ACCESS_TOKEN");
        assert_eq!(cfg.confirm.threshold, Impact::High);
    }

    #[test]
    fn threshold_parses_snake_case() {
        let cfg: Config = serde_yaml::from_str("confirm:\n  threshold: medium\n").unwrap();
        assert_eq!(cfg.confirm.threshold, Impact::Medium);
    }

    #[test]
    fn vault_url_substitutes_name() {
        let endpoints = EndpointsConfig::default();
        assert_eq!(endpoints.vault_url("contoso"), "https://contoso.vault.azure.net");

        let local = EndpointsConfig {
            resource_manager: "http://127.0.0.1:9000/".to_string(),
            key_vault: "http://127.0.0.1:9000/vaults/{vault}/".to_string(),
        };
        assert_eq!(local.vault_url("kv1"), "http://127.0.0.1:9000/vaults/kv1");
        assert_eq!(local.resource_manager_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.subscription_id = Some("7a1c3f6e-2d9b-4c1e-8f00-5b7d0e2a9c44".to_string());
        cfg.defaults.resource_group = Some("rg-ops".to_string());
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.subscription_id, cfg.subscription_id);
        assert_eq!(loaded.defaults.resource_group.as_deref(), Some("rg-ops"));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(AzopsError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert!(cfg.subscription_id.is_none());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        assert!(Config::init(dir.path()).unwrap());
        assert!(!Config::init(dir.path()).unwrap());
        Config::load(dir.path()).unwrap();
    }

    #[test]
    fn explicit_values_beat_defaults() {
        let mut cfg = Config::default();
        cfg.defaults.resource_group = Some("rg-default".to_string());
        assert_eq!(cfg.resource_group(Some("rg-cli")).unwrap(), "rg-cli");
        assert_eq!(cfg.resource_group(None).unwrap(), "rg-default");
        assert!(matches!(
            cfg.automation_account(None),
            Err(AzopsError::MissingAutomationAccount)
        ));
        assert!(matches!(
            cfg.subscription(Some("  ")),
            Err(AzopsError::MissingSubscription)
        ));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.subscription_id = Some("not-a-uuid".to_string());
        cfg.endpoints.key_vault = "http://localhost:8443".to_string();
        cfg.auth.token_env = String::new();

        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 3);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("not https")));
    }
}
