//! Key Vault certificate removal.
//!
//! With soft-delete enabled, removing a certificate moves it into the
//! vault's deleted state, where it stays recoverable until purged or until
//! its scheduled purge date.

use crate::client::ManagementClient;
use crate::config::{Config, EndpointsConfig};
use crate::error::Result;
use crate::paths::{validate_object_name, validate_vault_name};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedCertificateBundle {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    recovery_id: Option<String>,
    #[serde(default)]
    deleted_date: Option<i64>,
    #[serde(default)]
    scheduled_purge_date: Option<i64>,
    #[serde(default)]
    x5t: Option<String>,
    #[serde(default)]
    attributes: Option<CertificateAttributes>,
    #[serde(default)]
    tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateAttributes {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    recovery_level: Option<String>,
}

// ---------------------------------------------------------------------------
// DeletedCertificate
// ---------------------------------------------------------------------------

/// A certificate after soft-delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedCertificate {
    pub name: String,
    pub vault_name: String,
    pub id: Option<String>,
    pub recovery_id: Option<String>,
    pub deleted_date: Option<DateTime<Utc>>,
    pub scheduled_purge_date: Option<DateTime<Utc>>,
    pub enabled: Option<bool>,
    pub recovery_level: Option<String>,
    /// Base64url SHA-1 thumbprint (`x5t`).
    pub thumbprint: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl DeletedCertificate {
    fn from_bundle(vault_name: &str, name: &str, bundle: DeletedCertificateBundle) -> Self {
        let (enabled, recovery_level) = match bundle.attributes {
            Some(a) => (a.enabled, a.recovery_level),
            None => (None, None),
        };
        Self {
            name: name.to_string(),
            vault_name: vault_name.to_string(),
            id: bundle.id,
            recovery_id: bundle.recovery_id,
            deleted_date: bundle.deleted_date.and_then(unix_time),
            scheduled_purge_date: bundle.scheduled_purge_date.and_then(unix_time),
            enabled,
            recovery_level,
            thumbprint: bundle.x5t,
            tags: bundle.tags.unwrap_or_default(),
        }
    }
}

fn unix_time(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

// ---------------------------------------------------------------------------
// KeyVaultClient
// ---------------------------------------------------------------------------

pub struct KeyVaultClient {
    client: ManagementClient,
    endpoints: EndpointsConfig,
    api_version: String,
}

impl KeyVaultClient {
    pub fn new(client: ManagementClient, config: &Config) -> Self {
        Self {
            client,
            endpoints: config.endpoints.clone(),
            api_version: config.api_versions.key_vault.clone(),
        }
    }

    /// Soft-delete a certificate and all of its versions.
    pub fn delete_certificate(&self, vault_name: &str, name: &str) -> Result<DeletedCertificate> {
        validate_vault_name(vault_name)?;
        validate_object_name(name)?;
        let url = format!("{}/certificates/{name}", self.endpoints.vault_url(vault_name));
        let bundle: DeletedCertificateBundle = self.client.delete_json(&url, &self.api_version)?;
        tracing::info!(vault = vault_name, certificate = name, "certificate deleted");
        Ok(DeletedCertificate::from_bundle(vault_name, name, bundle))
    }

    /// Permanently remove a certificate that is already in the deleted state.
    pub fn purge_certificate(&self, vault_name: &str, name: &str) -> Result<()> {
        validate_vault_name(vault_name)?;
        validate_object_name(name)?;
        let url = format!("{}/deletedcertificates/{name}", self.endpoints.vault_url(vault_name));
        self.client.delete(&url, &self.api_version)?;
        tracing::info!(vault = vault_name, certificate = name, "deleted certificate purged");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AzopsError;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> KeyVaultClient {
        let mut config = Config::default();
        config.endpoints.key_vault = format!("{}/vaults/{{vault}}", server.url());
        KeyVaultClient::new(ManagementClient::new("t0k").unwrap(), &config)
    }

    #[test]
    fn delete_certificate_projects_bundle() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", Matcher::Regex(r"^/vaults/contoso/certificates/web(\?.*)?$".to_string()))
            .match_query(Matcher::UrlEncoded("api-version".into(), "7.4".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "https://contoso.vault.azure.net/certificates/web/7f1c",
                    "recoveryId": "https://contoso.vault.azure.net/deletedcertificates/web",
                    "deletedDate": 1700000000,
                    "scheduledPurgeDate": 1707776000,
                    "x5t": "fLi3U52HunIVNXubkEnf8tP6Wbo",
                    "attributes": {"enabled": true, "recoveryLevel": "Recoverable+Purgeable"},
                    "tags": {"env": "prod"}
                }"#,
            )
            .create();

        let cert = client_for(&server).delete_certificate("contoso", "web").unwrap();

        mock.assert();
        assert_eq!(cert.name, "web");
        assert_eq!(cert.vault_name, "contoso");
        assert_eq!(
            cert.recovery_id.as_deref(),
            Some("https://contoso.vault.azure.net/deletedcertificates/web")
        );
        assert_eq!(cert.deleted_date.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(cert.enabled, Some(true));
        assert_eq!(cert.recovery_level.as_deref(), Some("Recoverable+Purgeable"));
        assert_eq!(cert.tags.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn null_tags_parse_as_empty() {
        let mut server = mockito::Server::new();
        server
            .mock("DELETE", Matcher::Regex(r"^/vaults/contoso/certificates/web(\?.*)?$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "https://contoso.vault.azure.net/certificates/web/7f1c", "tags": null}"#)
            .create();

        let cert = client_for(&server).delete_certificate("contoso", "web").unwrap();

        assert!(cert.tags.is_empty());
        assert_eq!(cert.enabled, None);
    }

    #[test]
    fn purge_hits_deleted_certificates_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", Matcher::Regex(r"^/vaults/contoso/deletedcertificates/web(\?.*)?$".to_string()))
            .with_status(204)
            .create();

        client_for(&server).purge_certificate("contoso", "web").unwrap();
        mock.assert();
    }

    #[test]
    fn invalid_names_never_reach_the_service() {
        let mut server = mockito::Server::new();
        let mock = server.mock("DELETE", Matcher::Any).expect(0).create();
        let kv = client_for(&server);

        assert!(matches!(
            kv.delete_certificate("kv", "web"),
            Err(AzopsError::InvalidVaultName(_))
        ));
        assert!(matches!(
            kv.purge_certificate("contoso", ""),
            Err(AzopsError::Empty("name"))
        ));
        mock.assert();
    }
}
