use thiserror::Error;

#[derive(Debug, Error)]
pub enum AzopsError {
    #[error("not initialized: run 'azops config init'")]
    NotInitialized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request failed with status {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid vault name '{0}': must be 3-24 characters, start with a letter, and contain only letters, digits and hyphens")]
    InvalidVaultName(String),

    #[error("invalid name '{0}': must be 1-127 characters of letters, digits and hyphens")]
    InvalidObjectName(String),

    #[error("invalid variable name '{0}': must be 1-128 characters without control characters, any of <>*%&:\\?.+/ or a trailing space")]
    InvalidVariableName(String),

    #[error("invalid resource group '{0}': must be 1-90 letters, digits, '-', '_', '.', '(' or ')' and must not end with '.'")]
    InvalidResourceGroup(String),

    #[error("invalid automation account name '{0}': must be 6-50 characters, start with a letter, end with a letter or digit, and contain only letters, digits and hyphens")]
    InvalidAccountName(String),

    #[error("invalid subscription '{0}': must be a UUID")]
    InvalidSubscription(String),

    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("no access token: set the {0} environment variable")]
    MissingToken(String),

    #[error("no subscription: pass --subscription or set subscription_id in config")]
    MissingSubscription,

    #[error("no resource group: pass --resource-group or set defaults.resource_group in config")]
    MissingResourceGroup,

    #[error("no automation account: pass --account or set defaults.automation_account in config")]
    MissingAutomationAccount,

    #[error("home directory not found: set HOME or AZOPS_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AzopsError>;
