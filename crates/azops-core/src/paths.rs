use crate::error::{AzopsError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

/// Project-local home directory name, searched upward from the cwd.
pub const AZOPS_DIR: &str = ".azops";
pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// `~/.azops`, the fallback home when no project-local `.azops/` exists.
pub fn user_home_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(AZOPS_DIR))
        .ok_or(AzopsError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static VAULT_NAME_RE: OnceLock<Regex> = OnceLock::new();
static OBJECT_NAME_RE: OnceLock<Regex> = OnceLock::new();
static RESOURCE_GROUP_RE: OnceLock<Regex> = OnceLock::new();
static ACCOUNT_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn vault_name_re() -> &'static Regex {
    VAULT_NAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9\-]{1,22}[a-zA-Z0-9]$").unwrap())
}

fn object_name_re() -> &'static Regex {
    OBJECT_NAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-]{1,127}$").unwrap())
}

fn resource_group_re() -> &'static Regex {
    RESOURCE_GROUP_RE.get_or_init(|| Regex::new(r"^[-\w._()]{1,90}$").unwrap())
}

fn account_name_re() -> &'static Regex {
    ACCOUNT_NAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9\-]{4,48}[a-zA-Z0-9]$").unwrap())
}

/// Characters the automation service refuses in a variable name.
const VARIABLE_NAME_FORBIDDEN: &[char] = &['<', '>', '*', '%', '&', ':', '\\', '?', '.', '+', '/'];

pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AzopsError::Empty("vault name"));
    }
    if !vault_name_re().is_match(name) {
        return Err(AzopsError::InvalidVaultName(name.to_string()));
    }
    Ok(())
}

/// Key Vault certificates, keys and secrets share this shape.
pub fn validate_object_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AzopsError::Empty("name"));
    }
    if !object_name_re().is_match(name) {
        return Err(AzopsError::InvalidObjectName(name.to_string()));
    }
    Ok(())
}

/// Automation variable names: 1-128 characters, no control characters, none
/// of `<>*%&:\?.+/`, no trailing space.
pub fn validate_variable_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AzopsError::Empty("name"));
    }
    let invalid = name.chars().count() > 128
        || name.ends_with(' ')
        || name
            .chars()
            .any(|c| c.is_control() || VARIABLE_NAME_FORBIDDEN.contains(&c));
    if invalid {
        return Err(AzopsError::InvalidVariableName(name.to_string()));
    }
    Ok(())
}

pub fn validate_resource_group(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AzopsError::Empty("resource group"));
    }
    if !resource_group_re().is_match(name) || name.ends_with('.') {
        return Err(AzopsError::InvalidResourceGroup(name.to_string()));
    }
    Ok(())
}

pub fn validate_account_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AzopsError::Empty("automation account"));
    }
    if !account_name_re().is_match(name) {
        return Err(AzopsError::InvalidAccountName(name.to_string()));
    }
    Ok(())
}

pub fn validate_subscription_id(id: &str) -> Result<()> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| AzopsError::InvalidSubscription(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
