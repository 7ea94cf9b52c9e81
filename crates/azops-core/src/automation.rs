//! Automation account variables.
//!
//! Variable values are stored by the service as JSON literals, so a plain
//! string `prod` is sent as `"\"prod\""` and decoded back on the way out.

use crate::client::ManagementClient;
use crate::config::Config;
use crate::error::{AzopsError, Result};
use crate::paths::{
    validate_account_name, validate_resource_group, validate_subscription_id,
    validate_variable_name,
};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct VariableCreateBody<'a> {
    name: &'a str,
    properties: VariableCreateProperties<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariableCreateProperties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    is_encrypted: bool,
}

#[derive(Debug, Deserialize)]
struct VariableResource {
    name: String,
    #[serde(default)]
    properties: VariableResourceProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariableResourceProperties {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    is_encrypted: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    last_modified_time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// NewVariable / Variable
// ---------------------------------------------------------------------------

/// Parameters for creating a variable.
#[derive(Debug, Clone, Default)]
pub struct NewVariable {
    pub name: String,
    pub value: Option<String>,
    pub description: Option<String>,
    pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub automation_account_name: String,
    pub resource_group_name: String,
    /// Decoded value; `None` for encrypted variables.
    pub value: Option<serde_json::Value>,
    pub encrypted: bool,
    pub description: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_modified_time: Option<DateTime<Utc>>,
}

impl Variable {
    fn from_resource(resource_group: &str, account: &str, res: VariableResource) -> Self {
        let props = res.properties;
        Self {
            name: res.name,
            automation_account_name: account.to_string(),
            resource_group_name: resource_group.to_string(),
            value: props.value.map(|raw| decode_value(&raw)),
            encrypted: props.is_encrypted,
            description: props.description,
            creation_time: props.creation_time,
            last_modified_time: props.last_modified_time,
        }
    }

    /// Value as shown to a human: strings unquoted, everything else as JSON.
    pub fn display_value(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

fn encode_value(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Values written by other tools are not always valid JSON; keep those raw.
fn decode_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

// ---------------------------------------------------------------------------
// AutomationClient
// ---------------------------------------------------------------------------

pub struct AutomationClient {
    client: ManagementClient,
    base_url: String,
    api_version: String,
    subscription_id: String,
}

impl AutomationClient {
    pub fn new(client: ManagementClient, config: &Config, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: config.endpoints.resource_manager_url().to_string(),
            api_version: config.api_versions.automation.clone(),
            subscription_id: subscription_id.into(),
        }
    }

    /// Each segment is percent-encoded on its own, so a name can never
    /// change the resource path.
    fn variable_url(&self, resource_group: &str, account: &str, name: &str) -> Result<Url> {
        let invalid = || AzopsError::InvalidEndpoint(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                resource_group,
                "providers",
                "Microsoft.Automation",
                "automationAccounts",
                account,
                "variables",
                name,
            ]);
        Ok(url)
    }

    fn check_scope(&self, resource_group: &str, account: &str) -> Result<()> {
        validate_subscription_id(&self.subscription_id)?;
        validate_resource_group(resource_group)?;
        validate_account_name(account)
    }

    pub fn create_variable(
        &self,
        resource_group: &str,
        account: &str,
        variable: &NewVariable,
    ) -> Result<Variable> {
        self.check_scope(resource_group, account)?;
        validate_variable_name(&variable.name)?;

        let body = VariableCreateBody {
            name: &variable.name,
            properties: VariableCreateProperties {
                value: variable.value.as_deref().map(encode_value).transpose()?,
                description: variable.description.as_deref(),
                is_encrypted: variable.encrypted,
            },
        };
        let url = self.variable_url(resource_group, account, &variable.name)?;
        let res: VariableResource = self.client.put_json(url.as_str(), &self.api_version, &body)?;
        tracing::info!(account, variable = %variable.name, "variable created");
        Ok(Variable::from_resource(resource_group, account, res))
    }

    pub fn delete_variable(&self, resource_group: &str, account: &str, name: &str) -> Result<()> {
        self.check_scope(resource_group, account)?;
        validate_variable_name(name)?;
        let url = self.variable_url(resource_group, account, name)?;
        self.client.delete(url.as_str(), &self.api_version)?;
        tracing::info!(account, variable = name, "variable removed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const SUB: &str = "7a1c3f6e-2d9b-4c1e-8f00-5b7d0e2a9c44";

    fn client_for(server: &mockito::Server) -> AutomationClient {
        let mut config = Config::default();
        config.endpoints.resource_manager = server.url();
        AutomationClient::new(ManagementClient::new("t0k").unwrap(), &config, SUB)
    }

    fn variable_path(name: &str) -> Matcher {
        Matcher::Regex(format!(
            r"^/subscriptions/{SUB}/resourceGroups/rg-ops/providers/Microsoft.Automation/automationAccounts/aa-ops/variables/{name}(\?.*)?$"
        ))
    }

    #[test]
    fn create_variable_sends_json_encoded_value() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", variable_path("region"))
            .match_query(Matcher::UrlEncoded("api-version".into(), "2023-11-01".into()))
            .match_body(Matcher::PartialJson(json!({
                "name": "region",
                "properties": {
                    "value": "\"westeurope\"",
                    "description": "deploy region",
                    "isEncrypted": false
                }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "region",
                    "properties": {
                        "value": "\"westeurope\"",
                        "isEncrypted": false,
                        "description": "deploy region",
                        "creationTime": "2024-03-01T10:00:00+00:00",
                        "lastModifiedTime": "2024-03-01T10:00:00+00:00"
                    }
                }"#,
            )
            .create();

        let var = client_for(&server)
            .create_variable(
                "rg-ops",
                "aa-ops",
                &NewVariable {
                    name: "region".to_string(),
                    value: Some("westeurope".to_string()),
                    description: Some("deploy region".to_string()),
                    encrypted: false,
                },
            )
            .unwrap();

        mock.assert();
        assert_eq!(var.value, Some(json!("westeurope")));
        assert_eq!(var.display_value(), "westeurope");
        assert_eq!(var.automation_account_name, "aa-ops");
        assert_eq!(var.resource_group_name, "rg-ops");
        assert!(var.creation_time.is_some());
    }

    #[test]
    fn encrypted_variable_has_no_value() {
        let mut server = mockito::Server::new();
        server
            .mock("PUT", variable_path("db-password"))
            .with_status(200)
            .with_body(r#"{"name":"db-password","properties":{"isEncrypted":true}}"#)
            .create();

        let var = client_for(&server)
            .create_variable(
                "rg-ops",
                "aa-ops",
                &NewVariable {
                    name: "db-password".to_string(),
                    value: Some("s3cret".to_string()),
                    encrypted: true,
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(var.encrypted);
        assert_eq!(var.value, None);
        assert_eq!(var.display_value(), "");
    }

    #[test]
    fn non_json_value_is_kept_raw() {
        assert_eq!(decode_value("42"), json!(42));
        assert_eq!(decode_value("plain"), json!("plain"));
    }

    #[test]
    fn delete_variable_hits_resource_url() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", variable_path("region"))
            .with_status(200)
            .create();

        client_for(&server)
            .delete_variable("rg-ops", "aa-ops", "region")
            .unwrap();
        mock.assert();
    }

    #[test]
    fn variable_url_encodes_each_segment() {
        let server = mockito::Server::new();
        let url = client_for(&server)
            .variable_url("rg-ops", "aa-ops", "db password")
            .unwrap();
        assert_eq!(
            url.path(),
            format!(
                "/subscriptions/{SUB}/resourceGroups/rg-ops/providers/Microsoft.Automation/automationAccounts/aa-ops/variables/db%20password"
            )
        );
    }

    #[test]
    fn underscore_names_are_accepted() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", variable_path("db_password"))
            .with_status(200)
            .create();

        client_for(&server)
            .delete_variable("rg-ops", "aa-ops", "db_password")
            .unwrap();
        mock.assert();
    }

    #[test]
    fn dot_segments_never_reach_the_service() {
        let mut server = mockito::Server::new();
        let mock = server.mock("DELETE", Matcher::Any).expect(0).create();
        let client = client_for(&server);

        assert!(matches!(
            client.delete_variable("..", "aa-ops", "region"),
            Err(AzopsError::InvalidResourceGroup(_))
        ));
        assert!(matches!(
            client.delete_variable("rg-ops", "..", "region"),
            Err(AzopsError::InvalidAccountName(_))
        ));
        assert!(matches!(
            client.delete_variable("rg-ops", "aa-ops", ".."),
            Err(AzopsError::InvalidVariableName(_))
        ));
        mock.assert();
    }

    #[test]
    fn subscription_must_be_a_uuid() {
        let mut server = mockito::Server::new();
        let mock = server.mock("DELETE", Matcher::Any).expect(0).create();
        let mut config = Config::default();
        config.endpoints.resource_manager = server.url();
        let client = AutomationClient::new(ManagementClient::new("t0k").unwrap(), &config, "s");

        assert!(matches!(
            client.delete_variable("rg-ops", "aa-ops", "region"),
            Err(AzopsError::InvalidSubscription(_))
        ));
        mock.assert();
    }

    #[test]
    fn empty_scope_is_rejected() {
        let server = mockito::Server::new();
        let client = client_for(&server);
        assert!(matches!(
            client.delete_variable("", "aa-ops", "region"),
            Err(AzopsError::Empty("resource group"))
        ));
        assert!(matches!(
            client.delete_variable("rg-ops", "", "region"),
            Err(AzopsError::Empty("automation account"))
        ));
    }
}
